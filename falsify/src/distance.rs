//! Multi-dimensional shrinking distance.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::shrinkable::Shrinkable;

/// An ordered tuple of non-negative dimensions measuring how far a value is from its
/// shrinking target.
///
/// Comparison is lexicographic with missing dimensions treated as zero, so `[3]` equals
/// `[3, 0]`. [`ShrinkingDistance::MAX`] compares greater than every finite distance.
#[derive(Clone)]
pub struct ShrinkingDistance {
    dimensions: Vec<u64>,
    max: bool,
}

impl ShrinkingDistance {
    /// Greater than all finite distances
    pub const MAX: ShrinkingDistance = ShrinkingDistance {
        dimensions: Vec::new(),
        max: true,
    };

    /// Less than or equal to all distances
    pub const MIN: ShrinkingDistance = ShrinkingDistance {
        dimensions: Vec::new(),
        max: false,
    };

    /// Create a distance from its dimensions
    pub fn of(dimensions: &[u64]) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            max: false,
        }
    }

    /// Distance of a container: its size followed by the summed distances of its elements
    pub fn for_collection<T>(elements: &[Shrinkable<T>]) -> Self {
        let summed = elements
            .iter()
            .map(Shrinkable::distance)
            .fold(ShrinkingDistance::of(&[0]), |sum, next| sum.plus(&next));
        ShrinkingDistance::of(&[elements.len() as u64]).append(&summed)
    }

    /// Concatenated distances of independently combined values
    pub fn combine<T>(shrinkables: &[Shrinkable<T>]) -> Self {
        shrinkables
            .iter()
            .map(Shrinkable::distance)
            .fold(ShrinkingDistance::of(&[]), |all, next| all.append(&next))
    }

    /// Dimension-wise saturating sum
    pub fn plus(&self, other: &ShrinkingDistance) -> Self {
        if self.max || other.max {
            return Self::MAX;
        }
        let length = self.dimensions.len().max(other.dimensions.len());
        let dimensions = (0..length)
            .map(|i| self.at(i).saturating_add(other.at(i)))
            .collect();
        Self {
            dimensions,
            max: false,
        }
    }

    /// Concatenate the dimensions of `other` after the dimensions of `self`
    pub fn append(&self, other: &ShrinkingDistance) -> Self {
        if self.max || other.max {
            return Self::MAX;
        }
        let mut dimensions = self.dimensions.clone();
        dimensions.extend_from_slice(&other.dimensions);
        Self {
            dimensions,
            max: false,
        }
    }

    /// The raw dimensions
    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    /// Number of dimensions
    pub fn size(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether this is [`ShrinkingDistance::MAX`]
    pub fn is_max(&self) -> bool {
        self.max
    }

    fn at(&self, index: usize) -> u64 {
        self.dimensions.get(index).copied().unwrap_or(0)
    }

    fn significant(&self) -> &[u64] {
        let end = self
            .dimensions
            .iter()
            .rposition(|&d| d != 0)
            .map_or(0, |last| last + 1);
        &self.dimensions[..end]
    }
}

impl Ord for ShrinkingDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.max, other.max) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let length = self.dimensions.len().max(other.dimensions.len());
        (0..length)
            .map(|i| self.at(i).cmp(&other.at(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ShrinkingDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ShrinkingDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ShrinkingDistance {}

impl Hash for ShrinkingDistance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // trailing zeros do not change equality
        self.max.hash(state);
        self.significant().hash(state);
    }
}

impl fmt::Debug for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max {
            write!(f, "ShrinkingDistance:MAX")
        } else {
            write!(f, "ShrinkingDistance:{:?}", self.dimensions)
        }
    }
}

impl fmt::Display for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
