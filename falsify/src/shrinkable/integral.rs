use std::collections::BTreeSet;
use std::hash::Hash;
use std::marker::PhantomData;

use num_traits::PrimInt;

use super::{Candidates, Shrinkable, ShrinkableValue, Value, sorted_by_distance};
use crate::distance::ShrinkingDistance;

/// Primitive integers that can be generated and shrunk.
///
/// All arithmetic happens on a widened `i128` representation.
pub trait IntegralValue: PrimInt + Hash + Value {
    /// Widen to `i128`
    fn to_wide(self) -> i128;

    /// Narrow from `i128`; the caller guarantees the value fits
    fn from_wide(wide: i128) -> Self;
}

macro_rules! impl_integral_value {
    ($($t:ty),*) => {
        $(
            impl IntegralValue for $t {
                fn to_wide(self) -> i128 {
                    self as i128
                }

                fn from_wide(wide: i128) -> Self {
                    wide as $t
                }
            }
        )*
    };
}

impl_integral_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

/// Fibonacci shrink candidates between `target` (inclusive) and `value` (exclusive).
///
/// Candidates are `target ± fib` and `value ∓ fib` for every Fibonacci number
/// `1, 2, 3, 5, 8, ...` smaller than the distance between both, ordered by their
/// distance to `target`. A value equal to its target has no candidates.
pub fn fibonacci_candidates(value: i128, target: i128) -> Vec<i128> {
    if value == target {
        return Vec::new();
    }
    let distance = value.abs_diff(target);
    let upwards = value > target;

    let mut candidates = BTreeSet::new();
    candidates.insert(target);
    for fib in fibonacci_below(distance) {
        candidates.insert(step(target, fib, upwards));
        candidates.insert(step(value, fib, !upwards));
    }
    candidates.remove(&value);

    let mut candidates: Vec<i128> = candidates.into_iter().collect();
    candidates.sort_by_key(|candidate| candidate.abs_diff(target));
    candidates
}

fn fibonacci_below(limit: u128) -> impl Iterator<Item = u128> {
    let mut pair = Some((1u128, 2u128));
    std::iter::from_fn(move || {
        let (current, next) = pair?;
        pair = current.checked_add(next).map(|after| (next, after));
        Some(current)
    })
    .take_while(move |fib| *fib < limit)
}

// both endpoints lie in i128, so wrapping arithmetic yields the exact result
fn step(from: i128, offset: u128, upwards: bool) -> i128 {
    if upwards {
        from.wrapping_add_unsigned(offset)
    } else {
        from.wrapping_sub_unsigned(offset)
    }
}

/// An integral value inside `[min, max]` shrinking towards `target`
pub struct IntegralShrinkable<T> {
    value: i128,
    min: i128,
    max: i128,
    target: i128,
    integral: PhantomData<fn() -> T>,
}

impl<T: IntegralValue> IntegralShrinkable<T> {
    /// Create the shrinkable of `value` within `[min, max]`
    pub fn shrinkable(value: T, min: T, max: T, target: T) -> Shrinkable<T> {
        Shrinkable::new(Self::wide(
            value.to_wide(),
            min.to_wide(),
            max.to_wide(),
            target.to_wide(),
        ))
    }

    fn wide(value: i128, min: i128, max: i128, target: i128) -> Self {
        Self {
            value,
            min,
            max,
            target,
            integral: PhantomData,
        }
    }

    fn with_value(&self, value: i128) -> Shrinkable<T> {
        Shrinkable::new(Self::wide(value, self.min, self.max, self.target))
    }

    fn in_range(&self, value: i128) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl<T: IntegralValue> ShrinkableValue<T> for IntegralShrinkable<T> {
    fn value(&self) -> T {
        T::from_wide(self.value)
    }

    fn distance(&self) -> ShrinkingDistance {
        let distance = self.value.abs_diff(self.target);
        ShrinkingDistance::of(&[u64::try_from(distance).unwrap_or(u64::MAX)])
    }

    fn shrink(&self) -> Candidates<T> {
        let candidates = fibonacci_candidates(self.value, self.target)
            .into_iter()
            .filter(|candidate| self.in_range(*candidate))
            .map(|candidate| self.with_value(candidate))
            .collect();
        sorted_by_distance(candidates)
    }

    fn magnitude(&self) -> Option<u128> {
        Some(self.value.abs_diff(self.target))
    }

    fn grow(&self, by: u128) -> Option<Shrinkable<T>> {
        if by == 0 {
            return None;
        }
        let up = self.value.checked_add_unsigned(by).filter(|v| self.in_range(*v));
        let down = self.value.checked_sub_unsigned(by).filter(|v| self.in_range(*v));
        let grown = match self.value.cmp(&self.target) {
            std::cmp::Ordering::Greater => up,
            std::cmp::Ordering::Less => down,
            std::cmp::Ordering::Equal => up.or(down),
        };
        grown.map(|value| self.with_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_set(value: i128, target: i128) -> BTreeSet<i128> {
        fibonacci_candidates(value, target).into_iter().collect()
    }

    #[test]
    fn test_fibonacci_candidates_from_both_ends() {
        let expected: BTreeSet<i128> = [
            0, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 88, 87, 85, 82, 77, 69, 56, 35,
        ]
        .into_iter()
        .collect();
        assert_eq!(candidate_set(90, 0), expected);
    }

    #[test]
    fn test_fibonacci_candidates_for_negative_values() {
        let expected: BTreeSet<i128> = [0, -1, -2, -3, -5, -8, -9, -7].into_iter().collect();
        assert_eq!(candidate_set(-10, 0), expected);
    }

    #[test]
    fn test_fibonacci_candidates_towards_shifted_target() {
        assert_eq!(fibonacci_candidates(10, 5), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_no_candidates_at_target() {
        assert!(fibonacci_candidates(42, 42).is_empty());
    }

    #[test]
    fn test_candidates_ordered_by_distance() {
        let candidates = fibonacci_candidates(90, 0);
        assert_eq!(candidates.first(), Some(&0));
        assert!(candidates.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_candidates_for_extreme_values() {
        let candidates = fibonacci_candidates(i128::MAX, i128::MIN);
        assert_eq!(candidates.first(), Some(&i128::MIN));
        assert!(candidates.iter().all(|c| *c < i128::MAX));
    }

    #[test]
    fn test_integral_shrinkable_distance_and_candidates() {
        let shrinkable = IntegralShrinkable::shrinkable(10u8, 5, 20, 5);
        assert_eq!(shrinkable.distance(), ShrinkingDistance::of(&[5]));
        let values: Vec<u8> = shrinkable.shrink().map(|s| s.value()).collect();
        assert_eq!(values, vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_distance_saturates() {
        let shrinkable = IntegralShrinkable::shrinkable(i128::MAX, i128::MIN, i128::MAX, 0);
        assert_eq!(shrinkable.distance(), ShrinkingDistance::of(&[u64::MAX]));
    }

    #[test]
    fn test_grow_moves_away_from_target() {
        let positive = IntegralShrinkable::shrinkable(5i32, -10, 10, 0);
        assert_eq!(positive.grow(3).map(|s| s.value()), Some(8));
        assert!(positive.grow(6).is_none());

        let negative = IntegralShrinkable::shrinkable(-5i32, -10, 10, 0);
        assert_eq!(negative.grow(3).map(|s| s.value()), Some(-8));

        let at_target = IntegralShrinkable::shrinkable(10i32, 0, 10, 10);
        assert_eq!(at_target.grow(4).map(|s| s.value()), Some(6));
    }
}
