//! Lazy enumeration helpers for shrinking and exhaustive generation.

use std::sync::Arc;

/// A restartable source of values
pub type Source<T> = Arc<dyn Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync>;

/// All index pairs `(i, j)` with `i < j < size`
pub fn distinct_pairs(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..size).flat_map(move |left| (left + 1..size).map(move |right| (left, right)))
}

/// All ordered index pairs `(i, j)` with `i != j`
pub fn ordered_pairs(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..size).flat_map(move |left| {
        (0..size)
            .filter(move |right| *right != left)
            .map(move |right| (left, right))
    })
}

/// Cartesian product of restartable sources, rightmost source varying fastest.
///
/// The product of no sources has exactly one element: the empty list.
pub struct Product<T> {
    sources: Vec<Source<T>>,
    iterators: Vec<Box<dyn Iterator<Item = T>>>,
    current: Vec<T>,
    state: ProductState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductState {
    Fresh,
    Running,
    Done,
}

/// Create the cartesian product of `sources`
pub fn product<T: Clone>(sources: Vec<Source<T>>) -> Product<T> {
    Product {
        sources,
        iterators: Vec::new(),
        current: Vec::new(),
        state: ProductState::Fresh,
    }
}

impl<T: Clone> Product<T> {
    fn start(&mut self) -> bool {
        for source in &self.sources {
            let mut iterator = source();
            match iterator.next() {
                Some(first) => {
                    self.current.push(first);
                    self.iterators.push(iterator);
                }
                None => return false,
            }
        }
        true
    }

    fn advance(&mut self) -> bool {
        for position in (0..self.iterators.len()).rev() {
            if let Some(next) = self.iterators[position].next() {
                self.current[position] = next;
                return true;
            }
            let mut restarted = (self.sources[position])();
            match restarted.next() {
                Some(first) => {
                    self.current[position] = first;
                    self.iterators[position] = restarted;
                }
                None => return false,
            }
        }
        false
    }
}

impl<T: Clone> Iterator for Product<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let proceed = match self.state {
            ProductState::Fresh => self.start(),
            ProductState::Running => self.advance(),
            ProductState::Done => false,
        };
        if proceed {
            self.state = ProductState::Running;
            Some(self.current.clone())
        } else {
            self.state = ProductState::Done;
            None
        }
    }
}

/// All lists with sizes in `min..=max` built from the values of `source`
pub fn lists<T: Clone + 'static>(
    source: Source<T>,
    min_size: usize,
    max_size: usize,
) -> impl Iterator<Item = Vec<T>> {
    (min_size..=max_size).flat_map(move |size| product(vec![Arc::clone(&source); size]))
}

/// All subsets of `values` with sizes in `min..=max`, each in the order of `values`
pub fn combinations<T: Clone + 'static>(
    values: Vec<T>,
    min_size: usize,
    max_size: usize,
) -> impl Iterator<Item = Vec<T>> {
    let values = Arc::new(values);
    (min_size..=max_size.min(values.len())).flat_map(move |size| {
        let values = Arc::clone(&values);
        k_combinations(values.len(), size)
            .map(move |indices| indices.iter().map(|i| values[*i].clone()).collect())
    })
}

/// Index sets of size `k` out of `n`, in lexicographic order
pub fn k_combinations(n: usize, k: usize) -> impl Iterator<Item = Vec<usize>> {
    let mut next = (k <= n).then(|| (0..k).collect::<Vec<usize>>());
    std::iter::from_fn(move || {
        let current = next.take()?;
        let mut following = current.clone();
        let mut position = k;
        while position > 0 {
            position -= 1;
            if following[position] < n - k + position {
                following[position] += 1;
                for later in position + 1..k {
                    following[later] = following[later - 1] + 1;
                }
                next = Some(following);
                break;
            }
        }
        Some(current)
    })
}

/// All orderings of `values`, in lexicographic order of positions
pub fn permutations<T: Clone + 'static>(values: Vec<T>) -> impl Iterator<Item = Vec<T>> {
    let mut next = Some((0..values.len()).collect::<Vec<usize>>());
    std::iter::from_fn(move || {
        let current = next.take()?;
        let mut following = current.clone();
        if next_permutation(&mut following) {
            next = Some(following);
        }
        Some(current.iter().map(|i| values[*i].clone()).collect())
    })
}

fn next_permutation(indices: &mut [usize]) -> bool {
    let Some(pivot) = (1..indices.len()).rev().find(|i| indices[i - 1] < indices[*i]) else {
        return false;
    };
    let pivot = pivot - 1;
    let Some(successor) = (pivot + 1..indices.len())
        .rev()
        .find(|i| indices[*i] > indices[pivot])
    else {
        return false;
    };
    indices.swap(pivot, successor);
    indices[pivot + 1..].reverse();
    true
}

/// Number of lists with sizes in `min..=max` over `element_count` values
pub fn list_count(element_count: u64, min_size: usize, max_size: usize) -> Option<u64> {
    (min_size..=max_size).try_fold(0u64, |sum, size| {
        let size = u32::try_from(size).ok()?;
        sum.checked_add(element_count.checked_pow(size)?)
    })
}

/// Number of subsets with sizes in `min..=max` out of `element_count` values
pub fn set_count(element_count: u64, min_size: usize, max_size: usize) -> Option<u64> {
    let max_size = (max_size as u64).min(element_count);
    (min_size as u64..=max_size).try_fold(0u64, |sum, size| {
        sum.checked_add(binomial(element_count, size)?)
    })
}

/// `n` over `k`, if it fits
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    (0..k).try_fold(1u64, |result, i| {
        result.checked_mul(n - i).map(|product| product / (i + 1))
    })
}

/// `n!`, if it fits
pub fn factorial(n: u64) -> Option<u64> {
    (1..=n).try_fold(1u64, |result, i| result.checked_mul(i))
}
