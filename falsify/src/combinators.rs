//! Combining independently generated values into one.
//!
//! `combine2` to `combine8` and [`combine_list`] generate every part on its own and join
//! the parts with a combinator function. The result shrinks part by part, then pairs of
//! parts together. [`with_builder`] assembles values by applying mutations to a builder.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::config::GeneratorConfig;
use crate::edge_cases::{self, EdgeCases};
use crate::error::Result;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::{BoxedGenerator, RandomGenerator};
use crate::shrinkable::{AnyValue, CombinedShrinkable, Shrinkable, Value, downcast_part, erase};

type Combinator<R> = Arc<dyn Fn(&[AnyValue]) -> R + Send + Sync>;

/// Erase the value type of an arbitrary
pub fn erased<A: Arbitrary + 'static>(arbitrary: A) -> BoxedArbitrary<AnyValue> {
    arbitrary.map(|value| Arc::new(value) as AnyValue).boxed()
}

/// Two shrinkables as one pair
pub fn zip_shrinkables<A: Value, B: Value>(first: &Shrinkable<A>, second: &Shrinkable<B>) -> Shrinkable<(A, B)> {
    CombinedShrinkable::shrinkable(
        vec![erase(first), erase(second)],
        Arc::new(|values: &[AnyValue]| (downcast_part::<A>(values, 0), downcast_part::<B>(values, 1))),
    )
}

/// Parts generated independently and joined by a combinator
pub struct CombinedArbitrary<R> {
    parts: Vec<BoxedArbitrary<AnyValue>>,
    combinator: Combinator<R>,
}

impl<R: Value> CombinedArbitrary<R> {
    pub fn new(parts: Vec<BoxedArbitrary<AnyValue>>, combinator: Combinator<R>) -> Self {
        Self { parts, combinator }
    }
}

impl<R: Value> Arbitrary for CombinedArbitrary<R> {
    type Value = R;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<R> {
        let generators: Vec<BoxedGenerator<AnyValue>> = self
            .parts
            .iter()
            .map(|part| part.generator_with_embedded_edge_cases(config))
            .collect();
        let combinator = Arc::clone(&self.combinator);
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            let parts = generators
                .iter()
                .map(|generator| generator.next(rng))
                .collect::<Result<Vec<_>>>()?;
            Ok(CombinedShrinkable::shrinkable(parts, Arc::clone(&combinator)))
        })
    }

    /// The product of all parts; absent if any part cannot be enumerated
    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<R>> {
        let parts = self
            .parts
            .iter()
            .map(|part| part.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        exhaustive::combine(parts, Arc::clone(&self.combinator), max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<R> {
        let parts = self
            .parts
            .iter()
            .map(|part| part.edge_cases(max_edge_cases))
            .collect();
        edge_cases::combine(parts, Arc::clone(&self.combinator), max_edge_cases)
    }
}

macro_rules! combine_arbitraries {
    ($(#[$doc:meta])* $name:ident: $($arbitrary:ident $param:ident $index:tt),+) => {
        $(#[$doc])*
        pub fn $name<$($arbitrary,)+ R, F>($($param: $arbitrary,)+ combinator: F) -> CombinedArbitrary<R>
        where
            $($arbitrary: Arbitrary + 'static,)+
            R: Value,
            F: Fn($(<$arbitrary as Arbitrary>::Value),+) -> R + Send + Sync + 'static,
        {
            CombinedArbitrary::new(
                vec![$(erased($param)),+],
                Arc::new(move |values: &[AnyValue]| {
                    combinator($(downcast_part::<<$arbitrary as Arbitrary>::Value>(values, $index)),+)
                }),
            )
        }
    };
}

combine_arbitraries!(
    /// Combine two arbitraries
    combine2: A1 a1 0, A2 a2 1
);
combine_arbitraries!(combine3: A1 a1 0, A2 a2 1, A3 a3 2);
combine_arbitraries!(combine4: A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3);
combine_arbitraries!(combine5: A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3, A5 a5 4);
combine_arbitraries!(combine6: A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3, A5 a5 4, A6 a6 5);
combine_arbitraries!(combine7: A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3, A5 a5 4, A6 a6 5, A7 a7 6);
combine_arbitraries!(
    /// Combine eight arbitraries; use [`combine_list`] for more
    combine8: A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3, A5 a5 4, A6 a6 5, A7 a7 6, A8 a8 7
);

/// Pairs of independently generated values
pub fn zip<A, B>(first: A, second: B) -> CombinedArbitrary<(A::Value, B::Value)>
where
    A: Arbitrary + 'static,
    B: Arbitrary + 'static,
{
    combine2(first, second, |a, b| (a, b))
}

/// Combine any number of arbitraries of one type
pub fn combine_list<A, R, F>(parts: Vec<A>, combinator: F) -> CombinedArbitrary<R>
where
    A: Arbitrary + 'static,
    R: Value,
    F: Fn(Vec<A::Value>) -> R + Send + Sync + 'static,
{
    let count = parts.len();
    CombinedArbitrary::new(
        parts.into_iter().map(erased).collect(),
        Arc::new(move |values: &[AnyValue]| {
            combinator((0..count).map(|index| downcast_part::<A::Value>(values, index)).collect())
        }),
    )
}

type Mutator<B> = Arc<dyn Fn(B, &AnyValue) -> B + Send + Sync>;

/// One mutation of a builder, applied with some probability
struct BuilderStep<B> {
    probability: f64,
    arbitrary: BoxedArbitrary<AnyValue>,
    identity: usize,
    mutator_name: String,
    mutator: Mutator<B>,
}

impl<B> Clone for BuilderStep<B> {
    fn clone(&self) -> Self {
        Self {
            probability: self.probability,
            arbitrary: self.arbitrary.clone(),
            identity: self.identity,
            mutator_name: self.mutator_name.clone(),
            mutator: Arc::clone(&self.mutator),
        }
    }
}

/// Start a builder combination; `name` identifies the builder supplier
pub fn with_builder<B: Value>(name: impl Into<String>, supplier: impl Fn() -> B + Send + Sync + 'static) -> BuilderCombinator<B> {
    BuilderCombinator {
        name: name.into(),
        supplier: Arc::new(supplier),
        steps: Vec::new(),
    }
}

/// Values built by applying generated values to a fresh builder.
///
/// Two builder combinators are equal when their supplier names and their sequences of
/// (probability, arbitrary, mutator name) are equal. Arbitraries compare by identity.
pub struct BuilderCombinator<B> {
    name: String,
    supplier: Arc<dyn Fn() -> B + Send + Sync>,
    steps: Vec<BuilderStep<B>>,
}

impl<B> Clone for BuilderCombinator<B> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            supplier: Arc::clone(&self.supplier),
            steps: self.steps.clone(),
        }
    }
}

impl<B: Value> BuilderCombinator<B> {
    /// Always apply `mutator` with a value of `arbitrary`
    pub fn use_arbitrary<T: Value>(
        self,
        arbitrary: &BoxedArbitrary<T>,
        mutator_name: impl Into<String>,
        mutator: impl Fn(B, T) -> B + Send + Sync + 'static,
    ) -> Self {
        self.use_arbitrary_with_probability(1.0, arbitrary, mutator_name, mutator)
    }

    /// Apply `mutator` with a value of `arbitrary` in the given share of values
    pub fn use_arbitrary_with_probability<T: Value>(
        mut self,
        probability: f64,
        arbitrary: &BoxedArbitrary<T>,
        mutator_name: impl Into<String>,
        mutator: impl Fn(B, T) -> B + Send + Sync + 'static,
    ) -> Self {
        self.steps.push(BuilderStep {
            probability: probability.clamp(0.0, 1.0),
            arbitrary: erased(arbitrary.clone()),
            identity: arbitrary.identity(),
            mutator_name: mutator_name.into(),
            mutator: Arc::new(move |builder, value| mutator(builder, downcast_part::<T>(std::slice::from_ref(value), 0))),
        });
        self
    }

    /// Finish every built value with `finisher`
    pub fn build<R: Value>(self, finisher: impl Fn(B) -> R + Send + Sync + 'static) -> BuilderArbitrary<B, R> {
        BuilderArbitrary {
            combinator: self,
            finisher: Arc::new(finisher),
        }
    }

    fn key(&self) -> (&str, Vec<(u64, usize, &str)>) {
        let steps = self
            .steps
            .iter()
            .map(|step| (step.probability.to_bits(), step.identity, step.mutator_name.as_str()))
            .collect();
        (self.name.as_str(), steps)
    }

    fn always_applied(&self) -> bool {
        self.steps.iter().all(|step| step.probability >= 1.0)
    }

    fn builder_function<R: Value>(&self, used: Vec<usize>, finisher: Arc<dyn Fn(B) -> R + Send + Sync>) -> Combinator<R> {
        let supplier = Arc::clone(&self.supplier);
        let mutators: Vec<Mutator<B>> = used.iter().map(|index| Arc::clone(&self.steps[*index].mutator)).collect();
        Arc::new(move |values: &[AnyValue]| {
            let builder = mutators
                .iter()
                .zip(values)
                .fold(supplier(), |builder, (mutator, value)| mutator(builder, value));
            finisher(builder)
        })
    }
}

impl<B> PartialEq for BuilderCombinator<B>
where
    B: Value,
{
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<B: Value> Eq for BuilderCombinator<B> {}

impl<B: Value> Hash for BuilderCombinator<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl<B> std::fmt::Debug for BuilderCombinator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderCombinator")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// The arbitrary produced by [`BuilderCombinator::build`]
pub struct BuilderArbitrary<B, R> {
    combinator: BuilderCombinator<B>,
    finisher: Arc<dyn Fn(B) -> R + Send + Sync>,
}

impl<B: Value, R: Value> Arbitrary for BuilderArbitrary<B, R> {
    type Value = R;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<R> {
        let steps: Vec<(f64, BoxedGenerator<AnyValue>)> = self
            .combinator
            .steps
            .iter()
            .map(|step| (step.probability, step.arbitrary.generator_with_embedded_edge_cases(config)))
            .collect();
        let combinator = self.combinator.clone();
        let finisher = Arc::clone(&self.finisher);
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            let mut used = Vec::new();
            let mut parts = Vec::new();
            for (index, (probability, generator)) in steps.iter().enumerate() {
                if rng.gen_bool(*probability) {
                    used.push(index);
                    parts.push(generator.next(rng)?);
                }
            }
            let function = combinator.builder_function(used, Arc::clone(&finisher));
            Ok(CombinedShrinkable::shrinkable(parts, function))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<R>> {
        if !self.combinator.always_applied() {
            return None;
        }
        let parts = self
            .combinator
            .steps
            .iter()
            .map(|step| step.arbitrary.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        let used = (0..parts.len()).collect();
        let function = self.combinator.builder_function(used, Arc::clone(&self.finisher));
        exhaustive::combine(parts, function, max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<R> {
        if !self.combinator.always_applied() {
            return EdgeCases::none();
        }
        let parts = self
            .combinator
            .steps
            .iter()
            .map(|step| step.arbitrary.edge_cases(max_edge_cases))
            .collect();
        let used = (0..self.combinator.steps.len()).collect();
        let function = self.combinator.builder_function(used, Arc::clone(&self.finisher));
        edge_cases::combine(parts, function, max_edge_cases)
    }
}

/// Hash of a builder combinator, usable as a cache key
pub fn builder_key<B: Value>(combinator: &BuilderCombinator<B>) -> u64 {
    let mut hasher = DefaultHasher::new();
    combinator.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_combine2_generates_and_shrinks() {
        let sums = combine2(
            arbitraries::integers::<i32>().between(0, 100),
            arbitraries::integers::<i32>().between(0, 100),
            |a, b| (a, b),
        );
        let mut rng = StdRng::seed_from_u64(1);
        let shrinkable = sums.generator(&GeneratorConfig::default()).next(&mut rng).unwrap();
        let (a, b) = shrinkable.value();
        assert!((0..=100).contains(&a) && (0..=100).contains(&b));
        assert!(shrinkable.shrink().all(|c| c.distance() <= shrinkable.distance()));
    }

    #[test]
    fn test_exhaustive_count_is_product() {
        let combined = combine3(
            arbitraries::integers::<u8>().between(0, 2),
            arbitraries::of(vec!['a', 'b']),
            arbitraries::booleans(),
            |n, c, b| format!("{}{}{}", n, c, b),
        );
        let all = combined.exhaustive(100).unwrap();
        assert_eq!(all.max_count(), 12);
        assert_eq!(all.iter().count(), 12);
        assert!(combined.exhaustive(11).is_none());
    }

    #[test]
    fn test_exhaustive_absent_when_a_part_is_not_enumerable() {
        let combined = zip(
            arbitraries::integers::<u8>().between(0, 2),
            arbitraries::integers::<u64>(),
        );
        assert!(combined.exhaustive(1000).is_none());
    }

    #[test]
    fn test_edge_cases_are_combined() {
        let combined = zip(
            arbitraries::integers::<u8>().between(0, 1),
            arbitraries::of(vec!['x', 'y']),
        );
        let edge_cases = combined.edge_cases(100).values();
        assert_eq!(edge_cases, vec![(0, 'x'), (0, 'y'), (1, 'x'), (1, 'y')]);
    }

    #[test]
    fn test_combine_list() {
        let parts = vec![
            arbitraries::integers::<i64>().between(1, 1),
            arbitraries::integers::<i64>().between(2, 2),
            arbitraries::integers::<i64>().between(3, 3),
        ];
        let summed = combine_list(parts, |values| values.iter().sum::<i64>());
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(summed.sample(&mut rng).unwrap(), 6);
        assert_eq!(summed.exhaustive(10).unwrap().max_count(), 1);
    }

    #[test]
    fn test_combine8() {
        let one = || arbitraries::just(1u32);
        let combined = combine8(one(), one(), one(), one(), one(), one(), one(), one(), |a, b, c, d, e, f, g, h| {
            a + b + c + d + e + f + g + h
        });
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(combined.sample(&mut rng).unwrap(), 8);
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Person {
        name: String,
        age: u8,
    }

    #[test]
    fn test_builder_combination() {
        let names = arbitraries::strings().alpha().of_length(3).boxed();
        let ages = arbitraries::integers::<u8>().between(18, 99).boxed();
        let people = with_builder("person", Person::default)
            .use_arbitrary(&names, "name", |person, name| Person { name, ..person })
            .use_arbitrary(&ages, "age", |person, age| Person { age, ..person })
            .build(|person| person);
        let mut rng = StdRng::seed_from_u64(4);
        for person in people.generator(&GeneratorConfig::default()).samples(&mut rng, 50).unwrap() {
            assert_eq!(person.name.chars().count(), 3);
            assert!(person.age >= 18);
        }
    }

    #[test]
    fn test_builder_probability_zero_never_applies() {
        let ages = arbitraries::integers::<u8>().between(18, 99).boxed();
        let people = with_builder("person", Person::default)
            .use_arbitrary_with_probability(0.0, &ages, "age", |person, age| Person { age, ..person })
            .build(|person| person);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(people.sample(&mut rng).unwrap().age, 0);
        assert!(people.exhaustive(1000).is_none());
    }

    #[test]
    fn test_builder_equality_is_structural() {
        let ages = arbitraries::integers::<u8>().boxed();
        let other_ages = arbitraries::integers::<u8>().boxed();
        let first = with_builder("person", Person::default).use_arbitrary(&ages, "age", |p, age| Person { age, ..p });
        let second = with_builder("person", Person::default).use_arbitrary(&ages, "age", |p, age| Person { age, ..p });
        let third = with_builder("person", Person::default).use_arbitrary(&other_ages, "age", |p, age| Person { age, ..p });
        assert_eq!(first, second);
        assert_eq!(builder_key(&first), builder_key(&second));
        assert_ne!(first, third);
        assert_ne!(
            first,
            second.clone().use_arbitrary_with_probability(0.5, &ages, "age", |p, age| Person { age, ..p })
        );
    }
}
