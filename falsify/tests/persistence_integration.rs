#[cfg(feature = "persistence")]
mod persistence_tests {
    use falsify::*;
    use tempfile::TempDir;

    fn failing_check(seed: u64) -> PropertyCheck<Vec<u16>> {
        PropertyCheck::new(
            "no long lists",
            vec![arbitraries::lists(arbitraries::integers::<u16>()).boxed()],
            Falsifier::predicate(|values: &Vec<Vec<u16>>| values[0].len() < 4),
        )
        .with_config(
            CheckConfig::default()
                .with_seed(seed)
                .with_generation(GenerationMode::Randomized)
                .with_shrinking(ShrinkingMode::Full),
        )
    }

    #[test]
    fn test_saved_record_replays_shrinking() {
        let temp_dir = TempDir::new().unwrap();
        let store = ReplayStore::new(temp_dir.path()).unwrap();

        let result = failing_check(21).run().unwrap();
        assert_eq!(result.status, CheckStatus::Falsified);
        store.save(&ReplayRecord::from_result(&result)).unwrap();

        let record = store.load("no long lists").unwrap().unwrap();
        assert_eq!(record.generation_info.seed, Some(21));
        assert_eq!(record.shrunk_parameters.as_deref(), Some("[[0, 0, 0, 0]]"));

        let config = record.replay_config(CheckConfig::default()).unwrap();
        let rerun = failing_check(0).with_config(config.with_shrinking(ShrinkingMode::Off)).run().unwrap();
        let recreated = record.recreate(rerun.original_sample.unwrap()).unwrap();
        assert_eq!(recreated.parameters(), &[vec![0, 0, 0, 0]]);
    }

    #[test]
    fn test_records_for_several_checks() {
        let temp_dir = TempDir::new().unwrap();
        let store = ReplayStore::new(temp_dir.path()).unwrap();

        for seed in [1, 2] {
            let mut record = ReplayRecord::from_result(&failing_check(seed).run().unwrap());
            record.name = format!("check {}", seed);
            store.save(&record).unwrap();
        }

        let mut names: Vec<String> = store.load_all().unwrap().into_iter().map(|r| r.name).collect();
        names.sort();
        assert_eq!(names, vec!["check 1".to_string(), "check 2".to_string()]);
    }
}
