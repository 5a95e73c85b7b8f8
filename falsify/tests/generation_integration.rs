//! Integration tests for generating parameters: random, exhaustive, edge cases and data

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use falsify::arbitraries::{self, Supplier};
use falsify::parameters::{ExhaustiveParametersGenerator, RandomizedParametersGenerator};
use falsify::{
    Arbitrary, BoxedArbitrary, CheckConfig, CheckStatus, EdgeCasesMode, Error, Falsifier, GenerationMode,
    GeneratorConfig, ParametersGenerator, PropertyCheck, RandomGenerator, SourceOfRandomness, combinators,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs `check` and returns every parameter list the property saw
fn recorded_tries<P>(arbitraries: Vec<BoxedArbitrary<P>>, config: CheckConfig) -> Vec<Vec<P>>
where
    P: falsify::Value + Eq + std::hash::Hash,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let check = PropertyCheck::new(
        "recording",
        arbitraries,
        Falsifier::predicate(move |values: &Vec<P>| {
            recorder.lock().unwrap().push(values.clone());
            true
        }),
    )
    .with_config(config);
    let result = check.run().unwrap();
    assert_eq!(result.status, CheckStatus::Satisfied);
    let tries = seen.lock().unwrap().clone();
    tries
}

#[test]
fn test_combined_exhaustive_count() {
    let combined = combinators::combine3(
        arbitraries::integers::<u8>().between(1, 3),
        arbitraries::booleans(),
        arbitraries::of(vec!['a', 'b']),
        |n, flag, c| format!("{}{}{}", n, flag, c),
    );
    let exhaustive = combined.exhaustive(100).unwrap();
    assert_eq!(exhaustive.max_count(), 12);
    let all: HashSet<String> = exhaustive.iter().collect();
    assert_eq!(all.len(), 12);
    assert!(combined.exhaustive(11).is_none());
}

#[test]
fn test_auto_mode_enumerates_small_spaces() {
    init_logging();
    let tries = recorded_tries(
        vec![
            arbitraries::integers::<i32>().between(0, 4).boxed(),
            arbitraries::integers::<i32>().between(10, 11).boxed(),
        ],
        CheckConfig::default().with_tries(100),
    );
    assert_eq!(tries.len(), 10);
    let distinct: HashSet<Vec<i32>> = tries.into_iter().collect();
    assert_eq!(distinct.len(), 10);
}

#[test]
fn test_auto_mode_falls_back_to_random() {
    init_logging();
    let tries = recorded_tries(
        vec![arbitraries::integers::<i32>().between(0, 10_000).boxed()],
        CheckConfig::default().with_tries(50).with_seed(9),
    );
    assert_eq!(tries.len(), 50);
}

#[test]
fn test_exhaustive_mode_refuses_large_spaces() {
    let arbitraries = vec![arbitraries::integers::<i64>().between(0, 999).boxed()];
    assert_eq!(ExhaustiveParametersGenerator::max_count(&arbitraries, 2000), Some(1000));
    assert!(matches!(
        ExhaustiveParametersGenerator::new(&arbitraries, 10),
        Err(Error::TooManyCombinations { .. })
    ));

    let check = PropertyCheck::new("too many", arbitraries, Falsifier::predicate(|_: &Vec<i64>| true)).with_config(
        CheckConfig::default()
            .with_tries(10)
            .with_generation(GenerationMode::Exhaustive),
    );
    assert!(check.run().is_err());
}

#[test]
fn test_same_seed_same_parameters() {
    let arbitraries = || {
        vec![
            arbitraries::strings().alpha().of_max_length(8).boxed(),
            arbitraries::strings().numeric().boxed(),
        ]
    };
    let config = CheckConfig::default()
        .with_tries(40)
        .with_seed(1234)
        .with_generation(GenerationMode::Randomized);
    assert_eq!(
        recorded_tries(arbitraries(), config.clone()),
        recorded_tries(arbitraries(), config)
    );
}

#[test]
fn test_edge_cases_come_first() {
    init_logging();
    let arbitraries = vec![
        arbitraries::integers::<i32>().between(-50, 50).boxed(),
        arbitraries::integers::<i32>().between(-50, 50).boxed(),
    ];
    let config = CheckConfig::default()
        .with_tries(500)
        .with_seed(3)
        .with_generation(GenerationMode::Randomized)
        .with_edge_cases(EdgeCasesMode::First);

    let mut generator = RandomizedParametersGenerator::new(&arbitraries, &config);
    let total = generator.edge_cases_total();
    assert!(total > 0);

    let edge_values: HashSet<i32> = arbitraries[0]
        .edge_cases(1000)
        .values()
        .into_iter()
        .collect();
    for _ in 0..total {
        let parameters = generator.next_parameters().unwrap().unwrap();
        for shrinkable in parameters {
            assert!(edge_values.contains(&shrinkable.value()));
        }
    }
    assert_eq!(generator.edge_cases_tried(), total);
    assert!(generator.next_parameters().is_some());
}

#[test]
fn test_edge_cases_off_never_forced() {
    let config = CheckConfig::default()
        .with_tries(5)
        .with_seed(3)
        .with_edge_cases(EdgeCasesMode::None);
    let arbitraries = vec![arbitraries::integers::<i32>().boxed()];
    let generator = RandomizedParametersGenerator::new(&arbitraries, &config);
    assert_eq!(generator.edge_cases_total(), 0);
}

#[test]
fn test_data_driven_values_are_used_verbatim() {
    let without_data = PropertyCheck::new(
        "no data",
        vec![arbitraries::integers::<u8>().boxed()],
        Falsifier::predicate(|_: &Vec<u8>| true),
    )
    .with_config(CheckConfig::default().with_generation(GenerationMode::DataDriven));
    assert!(matches!(without_data.run(), Err(Error::EmptyChoice { .. })));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let check = PropertyCheck::new(
        "data",
        vec![arbitraries::integers::<u8>().boxed(), arbitraries::integers::<u8>().boxed()],
        Falsifier::predicate(move |values: &Vec<u8>| {
            recorder.lock().unwrap().push(values.clone());
            true
        }),
    )
    .with_data(vec![vec![1, 2], vec![3, 4]]);
    assert!(check.run().unwrap().is_satisfied());
    assert_eq!(*seen.lock().unwrap(), vec![vec![1, 2], vec![3, 4]]);
}

#[test]
fn test_unique_lists_hold_distinct_elements() {
    let mut random = SourceOfRandomness::seeded(77);
    let lists = arbitraries::lists(arbitraries::integers::<u8>().between(0, 20))
        .of_min_size(3)
        .of_max_size(15)
        .unique_elements();
    let generator = lists.generator(&GeneratorConfig::default());
    for _ in 0..100 {
        let list = generator.next(random.rng()).unwrap().value();
        let distinct: HashSet<u8> = list.iter().copied().collect();
        assert_eq!(distinct.len(), list.len());
        assert!((3..=15).contains(&list.len()));
    }
}

#[test]
fn test_recursive_structures_stay_within_depth() {
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Expr {
        Number(u8),
        Add(Box<Expr>, Box<Expr>),
    }

    fn depth(expr: &Expr) -> usize {
        match expr {
            Expr::Number(_) => 0,
            Expr::Add(left, right) => 1 + depth(left).max(depth(right)),
        }
    }

    fn exprs() -> BoxedArbitrary<Expr> {
        let numbers = Arc::new(|| arbitraries::integers::<u8>().between(0, 9).map(Expr::Number).boxed()) as Supplier<Expr>;
        let additions = Arc::new(|| {
            combinators::combine2(exprs(), exprs(), |l, r| Expr::Add(Box::new(l), Box::new(r))).boxed()
        }) as Supplier<Expr>;
        arbitraries::lazy_of(vec![numbers, additions]).boxed()
    }

    let tries = recorded_tries(
        vec![exprs()],
        CheckConfig::default().with_tries(200).with_seed(8),
    );
    assert_eq!(tries.len(), 200);
    assert!(tries.iter().all(|values| depth(&values[0]) <= 10));
}
