use super::sample_shrinker::{CandidateStream, Strategy};
use crate::shrinkable::{Shrinkable, Value};

/// Shrink the parameter at one position, holding all others fixed
pub(super) struct OnePosition {
    position: usize,
}

pub(super) fn one_position(position: usize) -> OnePosition {
    OnePosition { position }
}

impl<P: Value> Strategy<P> for OnePosition {
    fn candidates(&self, base: &[Shrinkable<P>]) -> CandidateStream<P> {
        let position = self.position;
        let base = base.to_vec();
        Box::new(base[position].shrink().map(move |candidate| {
            let mut shrunk = base.clone();
            shrunk[position] = candidate;
            shrunk
        }))
    }
}

/// Shrink two parameters together, pairing their candidates element-wise
pub(super) struct Pair {
    first: usize,
    second: usize,
}

pub(super) fn pair(first: usize, second: usize) -> Pair {
    Pair { first, second }
}

impl<P: Value> Strategy<P> for Pair {
    fn candidates(&self, base: &[Shrinkable<P>]) -> CandidateStream<P> {
        let (first, second) = (self.first, self.second);
        let base = base.to_vec();
        let firsts = base[first].shrink();
        let seconds = base[second].shrink();
        Box::new(firsts.zip(seconds).map(move |(a, b)| {
            let mut shrunk = base.clone();
            shrunk[first] = a;
            shrunk[second] = b;
            shrunk
        }))
    }
}

/// Shrink one parameter and grow another by the magnitude the first one gave up
pub(super) struct ShrinkAndGrow {
    shrunk: usize,
    grown: usize,
}

pub(super) fn shrink_and_grow(shrunk: usize, grown: usize) -> ShrinkAndGrow {
    ShrinkAndGrow { shrunk, grown }
}

impl<P: Value> Strategy<P> for ShrinkAndGrow {
    fn candidates(&self, base: &[Shrinkable<P>]) -> CandidateStream<P> {
        let (shrunk, grown) = (self.shrunk, self.grown);
        let base = base.to_vec();
        let Some(before) = base[shrunk].magnitude() else {
            return Box::new(std::iter::empty());
        };
        let candidates = base[shrunk].shrink();
        Box::new(candidates.filter_map(move |candidate| {
            let freed = before.checked_sub(candidate.magnitude()?)?;
            if freed == 0 {
                return None;
            }
            let bigger = base[grown].grow(freed)?;
            let mut changed = base.clone();
            changed[shrunk] = candidate;
            changed[grown] = bigger;
            Some(changed)
        }))
    }
}
