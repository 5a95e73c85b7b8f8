//! Integration tests for shrinking falsified samples
//!
//! These tests build falsified samples by hand and check where the shrink engine ends,
//! plus a few full property checks that go through generation first.

use falsify::shrinkable::IntegralShrinkable;
use falsify::{
    Arbitrary, CheckConfig, CheckStatus, FalsifiedSample, Falsifier, GenerationMode, PropertyCheck, PropertyFailure,
    ShrinkConfig, ShrinkEngine, Shrinkable, ShrinkingMode, ShrunkSampleRecreator, TryStatus, arbitraries, ensure,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn integer(value: i64, min: i64, max: i64) -> Shrinkable<i64> {
    IntegralShrinkable::shrinkable(value, min, max, 0)
}

fn falsified(shrinkables: Vec<Shrinkable<i64>>, falsifier: &Falsifier<Vec<i64>>) -> FalsifiedSample<i64> {
    let parameters: Vec<i64> = shrinkables.iter().map(|s| s.value()).collect();
    let result = falsifier.execute(&parameters);
    assert!(result.is_falsified(), "sample {:?} must falsify", parameters);
    FalsifiedSample::new(shrinkables, result.error().cloned(), result.footnotes().to_vec())
}

fn full_engine() -> ShrinkEngine {
    ShrinkEngine::with_config(ShrinkConfig::with_mode(ShrinkingMode::Full))
}

#[test]
fn test_single_integer_shrinks_to_boundary() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] < 5);
    let sample = falsified(vec![integer(77, -100, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[5]);
    assert!(shrunk.completed());
    assert!(shrunk.steps() > 0);
}

#[test]
fn test_negative_integer_shrinks_to_boundary() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] > -10);
    let sample = falsified(vec![integer(-93, -100, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[-10]);
}

#[test]
fn test_minimal_sample_is_not_shrunk_further() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] < 5);
    let sample = falsified(vec![integer(5, -100, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[5]);
    assert_eq!(shrunk.steps(), 0);
    assert!(
        shrunk
            .shrinking_sequence()
            .iter()
            .all(|status| *status != TryStatus::Falsified)
    );
}

#[test]
fn test_independent_parameters_shrink_to_targets() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[1] < 20);
    let sample = falsified(vec![integer(61, 0, 100), integer(88, 0, 100), integer(-7, -10, 10)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[0, 20, 0]);
}

#[test]
fn test_shrink_and_grow_moves_weight_to_later_parameter() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] + values[1] != 13);
    let sample = falsified(vec![integer(5, 0, 100), integer(8, 0, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    let parameters = shrunk.parameters();
    assert_eq!(parameters[0] + parameters[1], 13);
    assert!(parameters.contains(&0), "expected one parameter at zero, got {:?}", parameters);
}

#[test]
fn test_errors_of_other_kinds_are_not_accepted() {
    init_logging();
    let falsifier = Falsifier::property(|values: &Vec<i64>| -> Result<(), PropertyFailure> {
        let value = values[0];
        ensure(value <= 500, "too big")?;
        ensure(value <= 10, "big")?;
        Ok(())
    });
    let sample = falsified(vec![integer(900, 0, 1000)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[501]);
    assert_eq!(shrunk.sample().error().map(|e| e.message()), Some("too big"));
}

#[test]
fn test_panics_at_one_place_are_equivalent() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| {
        if values[0] >= 30 {
            panic!("value {} out of range", values[0]);
        }
        true
    });
    let sample = falsified(vec![integer(71, 0, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[30]);
    assert_eq!(shrunk.sample().error().map(|e| e.kind()), Some("panic"));
}

#[test]
fn test_panic_at_another_place_is_not_accepted() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| {
        let value = values[0];
        assert!(value < 50, "value {} reached the limit", value);
        let empty: Vec<i64> = Vec::new();
        value < 10 || empty[value as usize] == 0
    });
    let sample = falsified(vec![integer(80, 0, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[50]);
    assert_eq!(shrunk.sample().error().map(|e| e.message()), Some("value 50 reached the limit"));
}

#[test]
fn test_bounded_shrinking_stops_early() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] < 5);
    let sample = falsified(vec![integer(1_000_000, 0, 1_000_000)], &falsifier);

    let shrunk = ShrinkEngine::with_config(ShrinkConfig::bounded(3)).shrink(sample, &falsifier);
    assert!(!shrunk.completed());
    assert!(shrunk.parameters()[0] >= 5);
    assert!(shrunk.shrinking_sequence().len() <= 3);
}

#[test]
fn test_shrinking_off_keeps_sample() {
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] < 5);
    let sample = falsified(vec![integer(77, 0, 100)], &falsifier);

    let shrunk = ShrinkEngine::with_config(ShrinkConfig::with_mode(ShrinkingMode::Off)).shrink(sample, &falsifier);
    assert_eq!(shrunk.parameters(), &[77]);
    assert_eq!(shrunk.steps(), 0);
}

#[test]
fn test_recreation_follows_recorded_statuses() {
    init_logging();
    let falsifier = Falsifier::predicate(|values: &Vec<i64>| values[0] * values[1] < 300);
    let sample = falsified(vec![integer(40, 0, 100), integer(90, 0, 100)], &falsifier);

    let shrunk = full_engine().shrink(sample.clone(), &falsifier);
    let recreated = ShrunkSampleRecreator::new(sample)
        .recreate(shrunk.shrinking_sequence())
        .unwrap();
    assert_eq!(recreated.parameters(), shrunk.parameters());
}

#[test]
fn test_list_sum_shrinks_to_smallest_sum() {
    init_logging();
    let check = PropertyCheck::new(
        "list sum",
        vec![arbitraries::lists(arbitraries::integers::<i64>().between(0, 100)).boxed()],
        Falsifier::predicate(|values: &Vec<Vec<i64>>| values[0].iter().sum::<i64>() <= 50),
    )
    .with_config(
        CheckConfig::default()
            .with_seed(42)
            .with_shrinking(ShrinkingMode::Full),
    );

    let result = check.run().unwrap();
    assert_eq!(result.status, CheckStatus::Falsified);
    let shrunk = result.shrunk_sample.unwrap();
    assert_eq!(shrunk.parameters()[0].iter().sum::<i64>(), 51);
}

#[test]
fn test_string_shrinks_towards_short_lowest_chars() {
    init_logging();
    let check = PropertyCheck::new(
        "short strings",
        vec![arbitraries::strings().alpha().boxed()],
        Falsifier::predicate(|values: &Vec<String>| values[0].len() < 3),
    )
    .with_config(
        CheckConfig::default()
            .with_seed(5)
            .with_generation(GenerationMode::Randomized)
            .with_shrinking(ShrinkingMode::Full),
    );

    let result = check.run().unwrap();
    assert_eq!(result.status, CheckStatus::Falsified);
    assert_eq!(result.shrunk_sample.unwrap().parameters(), &["AAA".to_string()]);
}
