use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rand::RngCore;

use super::RandomDistribution;
use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::combinators::zip_shrinkables;
use crate::config::{DEFAULT_COLLECTION_SIZE, DEFAULT_MAX_MISSES, GeneratorConfig};
use crate::edge_cases::EdgeCases;
use crate::error::{Error, Result};
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::{BoxedGenerator, RandomGenerator};
use crate::shrinkable::{ContainerKind, ContainerShrinkable, Shrinkable, Value, all_distinct};

/// Size bounds shared by all containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SizeRange {
    min: usize,
    max: Option<usize>,
}

impl SizeRange {
    fn new() -> Self {
        Self { min: 0, max: None }
    }

    fn max(&self) -> usize {
        self.max.unwrap_or_else(|| self.min.max(DEFAULT_COLLECTION_SIZE))
    }

    fn check(&self) -> Result<()> {
        if self.min > self.max() {
            return Err(Error::invalid_range(format!(
                "min size {} is greater than max size {}",
                self.min,
                self.max()
            )));
        }
        Ok(())
    }

    /// A size biased towards the minimum; genSize caps how far above the minimum it goes
    fn random_size(&self, rng: &mut dyn RngCore, gen_size: usize) -> usize {
        let upper = self.max().min(self.min.saturating_add(gen_size));
        let size = RandomDistribution::Biased.next_value(rng, self.min as i128, upper as i128, self.min as i128);
        size as usize
    }

    fn allows_single(&self) -> bool {
        self.min <= 1 && self.max() >= 1
    }
}

/// Generate `size` element shrinkables; with `unique` no two values are equal
fn generate_elements<E: Value + PartialEq>(
    generator: &BoxedGenerator<E>,
    rng: &mut dyn RngCore,
    size: usize,
    unique: bool,
) -> Result<Vec<Shrinkable<E>>> {
    let mut elements: Vec<Shrinkable<E>> = Vec::with_capacity(size);
    let mut misses = 0;
    while elements.len() < size {
        let element = generator.next(rng)?;
        let value = element.value();
        if unique && elements.iter().any(|existing| existing.value() == value) {
            misses += 1;
            if misses > DEFAULT_MAX_MISSES {
                return Err(Error::too_many_misses(DEFAULT_MAX_MISSES, "unique elements"));
            }
            continue;
        }
        elements.push(element);
    }
    Ok(elements)
}

/// Containers of one element each, for the element's edge cases
fn singletons<E: Value + PartialEq, C: Value>(
    element_cases: EdgeCases<E>,
    min_size: usize,
    kind: &Arc<ContainerKind<E, C>>,
) -> Vec<Shrinkable<C>> {
    element_cases
        .into_vec()
        .into_iter()
        .map(|case| ContainerShrinkable::shrinkable(vec![case], min_size, Arc::clone(kind)))
        .collect()
}

/// Lists of elements from one arbitrary
pub struct ListArbitrary<T> {
    element: BoxedArbitrary<T>,
    sizes: SizeRange,
    unique: bool,
}

impl<T> Clone for ListArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            sizes: self.sizes,
            unique: self.unique,
        }
    }
}

impl<T: Value + PartialEq> ListArbitrary<T> {
    pub fn new(element: BoxedArbitrary<T>) -> Self {
        Self {
            element,
            sizes: SizeRange::new(),
            unique: false,
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.sizes.min = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.sizes.max = Some(max_size);
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }

    /// No element occurs twice, also not while shrinking
    pub fn unique_elements(mut self) -> Self {
        self.unique = true;
        self
    }

    fn kind(&self) -> Arc<ContainerKind<T, Vec<T>>> {
        let kind = ContainerKind::list();
        Arc::new(if self.unique { kind.requiring(all_distinct) } else { kind })
    }
}

impl<T: Value + PartialEq> Arbitrary for ListArbitrary<T> {
    type Value = Vec<T>;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<Vec<T>> {
        let elements = self.element.generator_with_embedded_edge_cases(config);
        let sizes = self.sizes;
        let unique = self.unique;
        let gen_size = config.gen_size;
        let kind = self.kind();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            sizes.check()?;
            let size = sizes.random_size(rng, gen_size);
            let elements = generate_elements(&elements, rng, size, unique)?;
            Ok(ContainerShrinkable::shrinkable(elements, sizes.min, Arc::clone(&kind)))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        self.sizes.check().ok()?;
        let element = self.element.exhaustive(max_samples)?;
        let lists = exhaustive::lists(&element, self.sizes.min, self.sizes.max(), max_samples)?;
        if self.unique {
            return Some(lists.filter(Arc::new(|list: &Vec<T>| all_distinct(list))));
        }
        Some(lists)
    }

    /// The empty list and lists of a single edge case element
    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Vec<T>> {
        if self.sizes.check().is_err() {
            return EdgeCases::none();
        }
        let kind = self.kind();
        let mut cases = Vec::new();
        if self.sizes.min == 0 {
            cases.push(ContainerShrinkable::shrinkable(Vec::new(), 0, Arc::clone(&kind)));
        }
        if self.sizes.allows_single() {
            cases.extend(singletons(self.element.edge_cases(max_edge_cases), self.sizes.min, &kind));
        }
        EdgeCases::from_shrinkables(cases).truncate(max_edge_cases)
    }
}

/// Sets of distinct elements
pub struct SetArbitrary<T> {
    element: BoxedArbitrary<T>,
    sizes: SizeRange,
}

impl<T: Value + Ord> SetArbitrary<T> {
    pub fn new(element: BoxedArbitrary<T>) -> Self {
        Self {
            element,
            sizes: SizeRange::new(),
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.sizes.min = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.sizes.max = Some(max_size);
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }

    fn kind() -> Arc<ContainerKind<T, BTreeSet<T>>> {
        Arc::new(ContainerKind::new(|elements: Vec<T>| elements.into_iter().collect()).requiring(all_distinct))
    }
}

impl<T: Value + Ord> Arbitrary for SetArbitrary<T> {
    type Value = BTreeSet<T>;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<BTreeSet<T>> {
        let elements = self.element.generator_with_embedded_edge_cases(config);
        let sizes = self.sizes;
        let gen_size = config.gen_size;
        let kind = Self::kind();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            sizes.check()?;
            let size = sizes.random_size(rng, gen_size);
            let elements = generate_elements(&elements, rng, size, true)?;
            Ok(ContainerShrinkable::shrinkable(elements, sizes.min, Arc::clone(&kind)))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<BTreeSet<T>>> {
        self.sizes.check().ok()?;
        let element = self.element.exhaustive(max_samples)?;
        exhaustive::sets(&element, self.sizes.min, self.sizes.max(), max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<BTreeSet<T>> {
        if self.sizes.check().is_err() {
            return EdgeCases::none();
        }
        let kind = Self::kind();
        let mut cases = Vec::new();
        if self.sizes.min == 0 {
            cases.push(ContainerShrinkable::shrinkable(Vec::new(), 0, Arc::clone(&kind)));
        }
        if self.sizes.allows_single() {
            cases.extend(singletons(self.element.edge_cases(max_edge_cases), self.sizes.min, &kind));
        }
        EdgeCases::from_shrinkables(cases).truncate(max_edge_cases)
    }
}

/// Maps with keys and values from separate arbitraries.
///
/// Entries shrink as pairs; a shrunk key never collides with another key.
pub struct MapArbitrary<K, V> {
    keys: BoxedArbitrary<K>,
    values: BoxedArbitrary<V>,
    sizes: SizeRange,
}

impl<K: Value + Ord, V: Value + PartialEq> MapArbitrary<K, V> {
    pub fn new(keys: BoxedArbitrary<K>, values: BoxedArbitrary<V>) -> Self {
        Self {
            keys,
            values,
            sizes: SizeRange::new(),
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.sizes.min = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.sizes.max = Some(max_size);
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }

    fn kind() -> Arc<ContainerKind<(K, V), BTreeMap<K, V>>> {
        Arc::new(
            ContainerKind::new(|entries: Vec<(K, V)>| entries.into_iter().collect()).requiring(|entries| {
                let keys: Vec<&K> = entries.iter().map(|(key, _)| key).collect();
                all_distinct(&keys)
            }),
        )
    }
}

impl<K: Value + Ord, V: Value + PartialEq> Arbitrary for MapArbitrary<K, V> {
    type Value = BTreeMap<K, V>;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<BTreeMap<K, V>> {
        let keys = self.keys.generator_with_embedded_edge_cases(config);
        let values = self.values.generator_with_embedded_edge_cases(config);
        let sizes = self.sizes;
        let gen_size = config.gen_size;
        let kind = Self::kind();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            sizes.check()?;
            let size = sizes.random_size(rng, gen_size);
            let keys = generate_elements(&keys, rng, size, true)?;
            let entries = keys
                .iter()
                .map(|key| Ok(zip_shrinkables(key, &values.next(rng)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(ContainerShrinkable::shrinkable(entries, sizes.min, Arc::clone(&kind)))
        })
    }

    /// Every key set combined with every assignment of values to its keys
    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<BTreeMap<K, V>>> {
        self.sizes.check().ok()?;
        let keys = self.keys.exhaustive(max_samples)?;
        let values = self.values.exhaustive(max_samples)?;
        let key_sets = exhaustive::sets(&keys, self.sizes.min, self.sizes.max(), max_samples)?;
        exhaustive::flat_map(
            &key_sets,
            Arc::new(move |keys: BTreeSet<K>| {
                let size = keys.len();
                let assignments = exhaustive::lists(&values, size, size, max_samples)?;
                Some(assignments.map(Arc::new(move |values: Vec<V>| {
                    keys.iter().cloned().zip(values).collect::<BTreeMap<K, V>>()
                })))
            }),
            max_samples,
        )
    }

    /// The empty map and maps of a single entry built from key and value edge cases
    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<BTreeMap<K, V>> {
        if self.sizes.check().is_err() {
            return EdgeCases::none();
        }
        let kind = Self::kind();
        let mut cases = Vec::new();
        if self.sizes.min == 0 {
            cases.push(ContainerShrinkable::shrinkable(Vec::new(), 0, Arc::clone(&kind)));
        }
        if self.sizes.allows_single() {
            let values = self.values.edge_cases(max_edge_cases);
            'keys: for key in self.keys.edge_cases(max_edge_cases).iter() {
                for value in values.iter() {
                    if cases.len() >= max_edge_cases {
                        break 'keys;
                    }
                    let entry = zip_shrinkables(key, value);
                    cases.push(ContainerShrinkable::shrinkable(vec![entry], self.sizes.min, Arc::clone(&kind)));
                }
            }
        }
        EdgeCases::from_shrinkables(cases).truncate(max_edge_cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> GeneratorConfig {
        GeneratorConfig::default()
    }

    #[test]
    fn test_list_sizes_and_elements() {
        let lists = arbitraries::integers::<i32>()
            .between(0, 20)
            .list()
            .of_min_size(2)
            .of_max_size(10);
        let mut rng = StdRng::seed_from_u64(1);
        for list in lists.generator(&config()).samples(&mut rng, 100).unwrap() {
            assert!((2..=10).contains(&list.len()));
            assert!(list.iter().all(|v| (0..=20).contains(v)));
        }
    }

    #[test]
    fn test_list_sizes_are_biased_small() {
        let lists = arbitraries::integers::<u8>().list().of_max_size(1000);
        let mut rng = StdRng::seed_from_u64(2);
        let small = lists
            .generator(&config().with_gen_size(1000))
            .samples(&mut rng, 200)
            .unwrap()
            .iter()
            .filter(|list| list.len() < 100)
            .count();
        assert!(small > 100);
    }

    #[test]
    fn test_unique_list_shrinks_stay_unique() {
        let lists = arbitraries::integers::<i32>()
            .between(0, 100)
            .list()
            .of_size(5)
            .unique_elements();
        let mut rng = StdRng::seed_from_u64(3);
        let shrinkable = lists.generator(&config()).next(&mut rng).unwrap();
        assert!(all_distinct(&shrinkable.value()));
        for candidate in shrinkable.shrink().take(200) {
            assert!(all_distinct(&candidate.value()));
        }
    }

    #[test]
    fn test_unique_list_over_too_small_domain_fails() {
        let lists = arbitraries::integers::<u8>().between(0, 2).list().of_size(4).unique_elements();
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            lists.generator(&config()).next(&mut rng),
            Err(Error::TooManyFilterMisses { .. })
        ));
    }

    #[test]
    fn test_list_edge_cases() {
        let lists = arbitraries::integers::<i32>().between(0, 3).list();
        let cases = lists.edge_cases(100).values();
        assert_eq!(cases[0], Vec::<i32>::new());
        assert!(cases.contains(&vec![0]));
        assert!(cases.contains(&vec![3]));

        let non_empty = arbitraries::integers::<i32>().between(0, 3).list().of_min_size(2);
        assert!(non_empty.edge_cases(100).is_empty());
    }

    #[test]
    fn test_list_exhaustive() {
        let lists = arbitraries::booleans().list().of_max_size(2);
        let all = lists.exhaustive(100).unwrap();
        assert_eq!(all.max_count(), 7);
        assert_eq!(all.iter().count(), 7);
        assert!(arbitraries::booleans().list().exhaustive(1000).is_none());
    }

    #[test]
    fn test_set_generation_and_exhaustive() {
        let sets = arbitraries::integers::<u8>().between(0, 9).set().of_max_size(5);
        let mut rng = StdRng::seed_from_u64(5);
        for set in sets.generator(&config()).samples(&mut rng, 50).unwrap() {
            assert!(set.len() <= 5);
        }
        let small = arbitraries::integers::<u8>().between(0, 2).set();
        let all: Vec<BTreeSet<u8>> = small.exhaustive(100).unwrap().iter().collect();
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_map_generation_and_shrinking() {
        let maps = MapArbitrary::new(
            arbitraries::integers::<u8>().between(0, 50).boxed(),
            arbitraries::strings().alpha().of_max_length(3).boxed(),
        )
        .of_min_size(1)
        .of_max_size(4);
        let mut rng = StdRng::seed_from_u64(6);
        let shrinkable = maps.generator(&config()).next(&mut rng).unwrap();
        let map = shrinkable.value();
        assert!((1..=4).contains(&map.len()));
        for candidate in shrinkable.shrink().take(100) {
            assert!(!candidate.value().is_empty());
            assert!(candidate.distance() <= shrinkable.distance());
        }
    }

    #[test]
    fn test_map_exhaustive_and_edge_cases() {
        let maps = MapArbitrary::new(
            arbitraries::integers::<u8>().between(0, 1).boxed(),
            arbitraries::booleans().boxed(),
        );
        // {} + 2 single-key maps * 2 values + 1 two-key map * 4 assignments
        let all = maps.exhaustive(100).unwrap();
        assert_eq!(all.max_count(), 9);
        assert_eq!(all.iter().count(), 9);

        let cases = maps.edge_cases(100).values();
        assert!(cases[0].is_empty());
        assert!(cases.iter().skip(1).all(|map| map.len() == 1));
    }

    #[test]
    fn test_invalid_sizes() {
        let lists = arbitraries::integers::<u8>().list().of_min_size(5).of_max_size(2);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(lists.generator(&config()).next(&mut rng).is_err());
        assert!(lists.exhaustive(1000).is_none());
    }
}
