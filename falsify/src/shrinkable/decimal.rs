use std::collections::BTreeSet;

use super::integral::fibonacci_candidates;
use super::{Candidates, Shrinkable, ShrinkableValue, sorted_by_distance};
use crate::decimal::{Decimal, pow10};
use crate::distance::ShrinkingDistance;

/// A decimal inside `[min, max]` shrinking towards `target`.
///
/// All values share one scale. The integral and fractional distance to the target shrink
/// independently; the distance has one dimension for each.
pub struct DecimalShrinkable {
    unscaled: i128,
    min: i128,
    max: i128,
    target: i128,
    scale: u32,
}

impl DecimalShrinkable {
    /// Create the shrinkable for an unscaled value, range and target all at `scale`
    pub fn shrinkable(unscaled: i128, min: i128, max: i128, target: i128, scale: u32) -> Shrinkable<Decimal> {
        Shrinkable::new(Self {
            unscaled,
            min,
            max,
            target,
            scale,
        })
    }

    fn with_unscaled(&self, unscaled: i128) -> Shrinkable<Decimal> {
        Self::shrinkable(unscaled, self.min, self.max, self.target, self.scale)
    }

    fn unit(&self) -> i128 {
        pow10(self.scale)
    }

    /// Integral and fractional part of the distance to the target, and whether the value
    /// lies above the target
    fn split_difference(&self) -> (u128, u128, bool) {
        let difference = self.unscaled.abs_diff(self.target);
        let unit = self.unit().unsigned_abs();
        (difference / unit, difference % unit, self.unscaled >= self.target)
    }

    /// The unscaled value `integral` units and `fraction` away from the target
    fn away_from_target(&self, integral: u128, fraction: u128, upwards: bool) -> Option<i128> {
        let offset = integral
            .checked_mul(self.unit().unsigned_abs())?
            .checked_add(fraction)?;
        if upwards {
            self.target.checked_add_unsigned(offset)
        } else {
            self.target.checked_sub_unsigned(offset)
        }
    }

    fn candidates(&self) -> BTreeSet<i128> {
        let (integral, fraction, upwards) = self.split_difference();
        let mut offsets = Vec::new();

        let widest = i128::try_from(integral).unwrap_or(i128::MAX);
        for shrunk in fibonacci_candidates(widest, 0) {
            offsets.push((shrunk.unsigned_abs(), fraction));
        }
        if fraction != 0 {
            offsets.push((integral, 0));
            let narrow = i128::try_from(fraction).unwrap_or(i128::MAX);
            for shrunk in fibonacci_candidates(narrow, 0) {
                offsets.push((integral, shrunk.unsigned_abs()));
            }
            // fewer decimal places
            for places in 1..self.scale {
                let coarser = fraction - fraction % pow10(places).unsigned_abs();
                offsets.push((integral, coarser));
            }
        }

        let mut candidates: BTreeSet<i128> = offsets
            .into_iter()
            .filter_map(|(integral, fraction)| self.away_from_target(integral, fraction, upwards))
            .collect();
        candidates.remove(&self.unscaled);
        candidates.retain(|candidate| (self.min..=self.max).contains(candidate));
        candidates
    }
}

impl ShrinkableValue<Decimal> for DecimalShrinkable {
    fn value(&self) -> Decimal {
        Decimal::from_parts(self.unscaled, self.scale)
    }

    fn distance(&self) -> ShrinkingDistance {
        let (integral, fraction, _) = self.split_difference();
        let saturated = |part: u128| u64::try_from(part).unwrap_or(u64::MAX);
        ShrinkingDistance::of(&[saturated(integral), saturated(fraction)])
    }

    fn shrink(&self) -> Candidates<Decimal> {
        let candidates = self
            .candidates()
            .into_iter()
            .map(|unscaled| self.with_unscaled(unscaled))
            .collect();
        sorted_by_distance(candidates)
    }
}
