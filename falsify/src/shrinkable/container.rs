use std::collections::BTreeSet;
use std::sync::Arc;

use super::{Candidates, LazyConcat, Shrinkable, ShrinkableValue, Value, sorted_by_distance};
use crate::combinatorics::distinct_pairs;
use crate::distance::ShrinkingDistance;

type Collector<E, C> = Arc<dyn Fn(Vec<E>) -> C + Send + Sync>;
type Validity<E> = Arc<dyn Fn(&[E]) -> bool + Send + Sync>;

/// How a container is assembled from its elements and which candidates it accepts
pub struct ContainerKind<E, C> {
    collect: Collector<E, C>,
    sortable: bool,
    valid: Option<Validity<E>>,
}

impl<E: Value, C> ContainerKind<E, C> {
    /// A container built by `collect`; element order carries no meaning
    pub fn new(collect: impl Fn(Vec<E>) -> C + Send + Sync + 'static) -> Self {
        Self {
            collect: Arc::new(collect),
            sortable: false,
            valid: None,
        }
    }

    /// Element order matters, so sorting elements is a simplification
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Only element lists satisfying `valid` are acceptable candidates
    pub fn requiring(mut self, valid: impl Fn(&[E]) -> bool + Send + Sync + 'static) -> Self {
        self.valid = Some(Arc::new(valid));
        self
    }
}

impl<E: Value + PartialEq> ContainerKind<E, Vec<E>> {
    /// Plain list
    pub fn list() -> Self {
        Self::new(|elements| elements).sortable()
    }
}

/// Requirement that no two elements are equal
pub fn all_distinct<E: PartialEq>(elements: &[E]) -> bool {
    elements
        .iter()
        .enumerate()
        .all(|(index, element)| !elements[..index].contains(element))
}

/// A container of independently shrinkable elements.
///
/// Candidates, in order: size reductions, duplicate pairs shrunk together, each element
/// shrunk on its own, pairs of elements shrunk together, elements shrunk while a later
/// element grows by the same amount and finally sorted element orders.
pub struct ContainerShrinkable<E, C> {
    elements: Vec<Shrinkable<E>>,
    min_size: usize,
    kind: Arc<ContainerKind<E, C>>,
}

impl<E: Value + PartialEq, C: Value> ContainerShrinkable<E, C> {
    /// Create the shrinkable of a container with at least `min_size` elements
    pub fn shrinkable(
        elements: Vec<Shrinkable<E>>,
        min_size: usize,
        kind: Arc<ContainerKind<E, C>>,
    ) -> Shrinkable<C> {
        Shrinkable::new(Self {
            elements,
            min_size,
            kind,
        })
    }

    fn rebuild(&self, elements: Vec<Shrinkable<E>>) -> Option<Shrinkable<C>> {
        if elements.len() < self.min_size {
            return None;
        }
        if let Some(valid) = &self.kind.valid {
            let values: Vec<E> = elements.iter().map(Shrinkable::value).collect();
            if !valid(&values) {
                return None;
            }
        }
        Some(Self::shrinkable(
            elements,
            self.min_size,
            Arc::clone(&self.kind),
        ))
    }

    fn replaced(&self, replacements: &[(usize, Shrinkable<E>)]) -> Option<Shrinkable<C>> {
        let mut elements = self.elements.clone();
        for (index, element) in replacements {
            elements[*index] = element.clone();
        }
        self.rebuild(elements)
    }

    fn snapshot(&self) -> Arc<Self> {
        Arc::new(Self {
            elements: self.elements.clone(),
            min_size: self.min_size,
            kind: Arc::clone(&self.kind),
        })
    }

    fn shrink_size(&self) -> Candidates<C> {
        let size = self.elements.len();
        if size <= self.min_size {
            return Box::new(std::iter::empty());
        }
        let mut cuts: BTreeSet<Vec<usize>> = BTreeSet::new();
        cuts.insert((0..self.min_size).collect());
        cuts.insert((0..self.min_size + 1).filter(|i| *i < size - 1).collect());
        let half = size / 2;
        if half >= self.min_size {
            cuts.insert((0..half).collect());
            if size - half >= self.min_size && size - half < size {
                cuts.insert((half..size).collect());
            }
        }
        cuts.insert((1..size).collect());
        cuts.insert((0..size - 1).collect());
        for removed in 0..size {
            cuts.insert((0..size).filter(|i| *i != removed).collect());
        }

        let candidates = cuts
            .into_iter()
            .filter(|kept| kept.len() >= self.min_size && kept.len() < size)
            .filter_map(|kept| {
                self.rebuild(kept.iter().map(|i| self.elements[*i].clone()).collect())
            })
            .collect();
        sorted_by_distance(candidates)
    }

    fn shrink_duplicates(self: &Arc<Self>) -> Candidates<C> {
        let this = Arc::clone(self);
        Box::new(distinct_pairs(self.elements.len()).flat_map(move |(left, right)| {
            let this = Arc::clone(&this);
            let duplicates = this.elements[left].value() == this.elements[right].value();
            let candidates: Candidates<C> = if duplicates {
                let lefts = this.elements[left].shrink();
                let rights = this.elements[right].shrink();
                Box::new(
                    lefts
                        .zip(rights)
                        .filter(|(l, r)| l.value() == r.value())
                        .filter_map(move |(l, r)| this.replaced(&[(left, l), (right, r)])),
                )
            } else {
                Box::new(std::iter::empty())
            };
            candidates
        }))
    }

    fn shrink_one_after_another(self: &Arc<Self>) -> Candidates<C> {
        let this = Arc::clone(self);
        Box::new((0..self.elements.len()).flat_map(move |index| {
            let this = Arc::clone(&this);
            this.elements[index]
                .shrink()
                .filter_map(move |candidate| this.replaced(&[(index, candidate)]))
        }))
    }

    fn shrink_pairs(self: &Arc<Self>) -> Candidates<C> {
        let this = Arc::clone(self);
        Box::new(distinct_pairs(self.elements.len()).flat_map(move |(left, right)| {
            let this = Arc::clone(&this);
            let lefts = this.elements[left].shrink();
            let rights = this.elements[right].shrink();
            lefts
                .zip(rights)
                .filter_map(move |(l, r)| this.replaced(&[(left, l), (right, r)]))
        }))
    }

    fn shrink_and_grow(self: &Arc<Self>) -> Candidates<C> {
        let this = Arc::clone(self);
        Box::new(distinct_pairs(self.elements.len()).flat_map(move |(shrunk, grown)| {
            let this = Arc::clone(&this);
            let before = this.elements[shrunk].magnitude();
            this.elements[shrunk].shrink().filter_map(move |candidate| {
                let freed = before?.checked_sub(candidate.magnitude()?)?;
                let bigger = this.elements[grown].grow(freed)?;
                this.replaced(&[(shrunk, candidate), (grown, bigger)])
            })
        }))
    }

    fn sort(&self) -> Candidates<C> {
        if !self.kind.sortable {
            return Box::new(std::iter::empty());
        }
        let distances: Vec<ShrinkingDistance> =
            self.elements.iter().map(Shrinkable::distance).collect();
        let mut candidates = Vec::new();

        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by(|a, b| distances[*a].cmp(&distances[*b]));
        if order.iter().enumerate().any(|(position, index)| position != *index) {
            let sorted = order.iter().map(|i| self.elements[*i].clone()).collect();
            candidates.extend(self.rebuild(sorted));
        }
        for (left, right) in distinct_pairs(self.elements.len()) {
            if distances[left] > distances[right] {
                let mut swapped = self.elements.clone();
                swapped.swap(left, right);
                candidates.extend(self.rebuild(swapped));
            }
        }
        Box::new(candidates.into_iter())
    }
}

impl<E: Value + PartialEq, C: Value> ShrinkableValue<C> for ContainerShrinkable<E, C> {
    fn value(&self) -> C {
        (self.kind.collect)(self.elements.iter().map(Shrinkable::value).collect())
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(&self.elements)
    }

    fn shrink(&self) -> Candidates<C> {
        let size = self.snapshot();
        let duplicates = self.snapshot();
        let singles = self.snapshot();
        let pairs = self.snapshot();
        let grow = self.snapshot();
        let sort = self.snapshot();
        LazyConcat::new()
            .then(move || size.shrink_size())
            .then(move || duplicates.shrink_duplicates())
            .then(move || singles.shrink_one_after_another())
            .then(move || pairs.shrink_pairs())
            .then(move || grow.shrink_and_grow())
            .then(move || sort.sort())
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::IntegralShrinkable;

    fn list(values: &[i32], min_size: usize) -> Shrinkable<Vec<i32>> {
        let elements = values
            .iter()
            .map(|v| IntegralShrinkable::shrinkable(*v, -100, 100, 0))
            .collect();
        ContainerShrinkable::shrinkable(elements, min_size, Arc::new(ContainerKind::list()))
    }

    fn candidate_values(shrinkable: &Shrinkable<Vec<i32>>) -> Vec<Vec<i32>> {
        shrinkable.shrink().map(|s| s.value()).collect()
    }

    #[test]
    fn test_container_distance() {
        let shrinkable = list(&[3, -4, 5], 0);
        assert_eq!(shrinkable.distance(), ShrinkingDistance::of(&[3, 12]));
    }

    #[test]
    fn test_size_candidates_come_first() {
        let candidates = candidate_values(&list(&[3, 4, 5, 6], 0));
        assert_eq!(candidates[0], Vec::<i32>::new());
        assert!(candidates.contains(&vec![3, 4]));
        assert!(candidates.contains(&vec![5, 6]));
        assert!(candidates.contains(&vec![4, 5, 6]));
        assert!(candidates.contains(&vec![3, 4, 5]));
        assert!(candidates.contains(&vec![3, 5, 6]));
    }

    #[test]
    fn test_min_size_is_respected() {
        let shrinkable = list(&[3, 4, 5], 2);
        assert!(shrinkable.shrink().all(|c| c.value().len() >= 2));
        assert!(list(&[1, 2], 2).shrink().all(|c| c.value().len() == 2));
    }

    #[test]
    fn test_all_candidates_are_not_farther() {
        let shrinkable = list(&[7, -3, 7, 2], 0);
        let distance = shrinkable.distance();
        assert!(shrinkable.shrink().all(|c| c.distance() <= distance));
    }

    #[test]
    fn test_duplicates_shrink_together() {
        let candidates = candidate_values(&list(&[7, 7], 2));
        assert!(candidates.contains(&vec![0, 0]));
        let first_uneven = candidates.iter().position(|c| c[0] != c[1]).unwrap();
        let first_even = candidates.iter().position(|c| c[0] == c[1]).unwrap();
        assert!(first_even < first_uneven);
    }

    #[test]
    fn test_shrink_and_grow_preserves_total() {
        let candidates = candidate_values(&list(&[40, 20], 2));
        assert!(candidates.contains(&vec![0, 60]));
    }

    #[test]
    fn test_sort_candidates() {
        let candidates = candidate_values(&list(&[5, 1], 2));
        assert!(candidates.contains(&vec![1, 5]));
        assert!(!candidate_values(&list(&[1, 5], 2)).contains(&vec![5, 1]));
    }

    #[test]
    fn test_unsortable_container_is_not_sorted() {
        let elements = vec![
            IntegralShrinkable::shrinkable(5, 5, 10, 5),
            IntegralShrinkable::shrinkable(10, 5, 10, 5),
        ];
        let kind = ContainerKind::new(|elements: Vec<i32>| elements);
        let shrinkable = ContainerShrinkable::shrinkable(elements, 2, Arc::new(kind));
        assert!(!shrinkable.shrink().any(|c| c.value() == vec![10, 5]));
    }

    #[test]
    fn test_required_validity_filters_candidates() {
        let elements = vec![
            IntegralShrinkable::shrinkable(1, 0, 10, 0),
            IntegralShrinkable::shrinkable(2, 0, 10, 0),
        ];
        let kind = ContainerKind::list().requiring(all_distinct);
        let shrinkable = ContainerShrinkable::shrinkable(elements, 2, Arc::new(kind));
        assert!(shrinkable.shrink().all(|c| all_distinct(&c.value())));
        assert!(shrinkable.shrink().any(|c| c.value() == vec![0, 2]));
    }

    #[test]
    fn test_all_distinct() {
        assert!(all_distinct(&[1, 2, 3]));
        assert!(!all_distinct(&[1, 2, 1]));
        assert!(all_distinct::<i32>(&[]));
    }
}
