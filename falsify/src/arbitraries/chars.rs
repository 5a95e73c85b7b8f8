use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::arbitrary::Arbitrary;
use crate::config::GeneratorConfig;
use crate::edge_cases::EdgeCases;
use crate::error::{Error, Result};
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::BoxedGenerator;
use crate::shrinkable::{IntegralShrinkable, Shrinkable};

const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

/// Code point ranges used when no range was chosen: the basic multilingual plane
/// without surrogates and noncharacters
const DEFAULT_RANGES: [(char, char); 2] = [('\u{0}', '\u{D7FF}'), ('\u{E000}', '\u{FFFD}')];

const WHITESPACE: [char; 6] = [' ', '\t', '\n', '\r', '\u{0B}', '\u{0C}'];

/// Sorted, disjoint code point ranges
#[derive(Debug, Clone, PartialEq, Eq)]
struct CharRanges {
    ranges: Vec<(u32, u32)>,
}

impl CharRanges {
    fn new(chosen: &[(char, char)]) -> Self {
        let chosen = if chosen.is_empty() { &DEFAULT_RANGES[..] } else { chosen };
        let mut ranges: Vec<(u32, u32)> = Vec::new();
        for (from, to) in chosen {
            let (from, to) = (*from as u32, *to as u32);
            let (from, to) = (from.min(to), from.max(to));
            // surrogates are not chars
            if from < SURROGATES.0 && to > SURROGATES.1 {
                ranges.push((from, SURROGATES.0 - 1));
                ranges.push((SURROGATES.1 + 1, to));
            } else {
                ranges.push((from, to));
            }
        }
        ranges.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::new();
        for (from, to) in ranges {
            match merged.last_mut() {
                Some(last) if from <= last.1.saturating_add(1) => last.1 = last.1.max(to),
                _ => merged.push((from, to)),
            }
        }
        Self { ranges: merged }
    }

    fn count(&self) -> u64 {
        self.ranges
            .iter()
            .map(|(from, to)| u64::from(to - from) + 1)
            .sum()
    }

    fn char_at(&self, mut index: u64) -> char {
        for (from, to) in &self.ranges {
            let size = u64::from(to - from) + 1;
            if index < size {
                return char::from_u32(from + index as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
            index -= size;
        }
        char::REPLACEMENT_CHARACTER
    }

    fn index_of(&self, c: char) -> Option<u64> {
        let code = c as u32;
        let mut offset = 0u64;
        for (from, to) in &self.ranges {
            if (*from..=*to).contains(&code) {
                return Some(offset + u64::from(code - from));
            }
            offset += u64::from(to - from) + 1;
        }
        None
    }
}

/// Characters from a set of code point ranges.
///
/// Characters shrink towards the first character of the lowest range.
#[derive(Debug, Clone, Default)]
pub struct CharArbitrary {
    chosen: Vec<(char, char)>,
}

impl CharArbitrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all characters between `from` and `to`, both included
    pub fn range(mut self, from: char, to: char) -> Self {
        self.chosen.push((from, to));
        self
    }

    /// Add the given characters
    pub fn with(mut self, chars: &[char]) -> Self {
        self.chosen.extend(chars.iter().map(|c| (*c, *c)));
        self
    }

    /// Add all ASCII characters
    pub fn ascii(self) -> Self {
        self.range('\u{0}', '\u{7F}')
    }

    /// Add printable ASCII characters
    pub fn ascii_printable(self) -> Self {
        self.range(' ', '~')
    }

    pub fn alpha(self) -> Self {
        self.range('A', 'Z').range('a', 'z')
    }

    pub fn numeric(self) -> Self {
        self.range('0', '9')
    }

    pub fn alphanumeric(self) -> Self {
        self.alpha().numeric()
    }

    pub fn whitespace(self) -> Self {
        self.with(&WHITESPACE)
    }

    fn ranges(&self) -> CharRanges {
        CharRanges::new(&self.chosen)
    }

    fn shrinkable(ranges: &Arc<CharRanges>, index: u64) -> Shrinkable<char> {
        let max = ranges.count().saturating_sub(1);
        let ranges = Arc::clone(ranges);
        IntegralShrinkable::shrinkable(index, 0, max, 0).map(move |index| ranges.char_at(index))
    }

    fn checked_ranges(&self) -> Result<Arc<CharRanges>> {
        let ranges = self.ranges();
        if ranges.count() == 0 {
            return Err(Error::empty_choice("chars"));
        }
        Ok(Arc::new(ranges))
    }
}

impl Arbitrary for CharArbitrary {
    type Value = char;

    fn generator(&self, _config: &GeneratorConfig) -> BoxedGenerator<char> {
        let ranges = self.checked_ranges();
        BoxedGenerator::new(move |rng: &mut dyn RngCore| {
            let ranges = ranges.clone()?;
            let index = rng.gen_range(0..ranges.count());
            Ok(Self::shrinkable(&ranges, index))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<char>> {
        let ranges = self.checked_ranges().ok()?;
        let count = ranges.count();
        let indices = exhaustive::integral_range(0, i128::from(count) - 1, max_samples)?;
        Some(indices.map(Arc::new(move |index| ranges.char_at(index as u64))))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<char> {
        let Ok(ranges) = self.checked_ranges() else {
            return EdgeCases::none();
        };
        let mut indices: Vec<u64> = ranges
            .ranges
            .iter()
            .filter_map(|(from, _)| char::from_u32(*from).and_then(|c| ranges.index_of(c)))
            .collect();
        indices.push(ranges.count() - 1);
        indices.dedup();
        EdgeCases::from_shrinkables(
            indices
                .into_iter()
                .map(|index| Self::shrinkable(&ranges, index))
                .collect(),
        )
        .truncate(max_edge_cases)
    }
}
