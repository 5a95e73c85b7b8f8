use crate::arbitrary::Arbitrary;
use crate::config::GeneratorConfig;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::ExhaustiveGenerator;
use crate::generator::BoxedGenerator;

use super::{CharArbitrary, ListArbitrary};

/// Strings of characters from a [`CharArbitrary`].
///
/// A string is generated and shrunk as a list of characters, so shorter strings and
/// characters nearer to the start of the first range are simpler.
#[derive(Debug, Clone, Default)]
pub struct StringArbitrary {
    chars: CharArbitrary,
    min_length: usize,
    max_length: Option<usize>,
    unique: bool,
}

impl StringArbitrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn of_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn of_length(self, length: usize) -> Self {
        self.of_min_length(length).of_max_length(length)
    }

    pub fn alpha(mut self) -> Self {
        self.chars = self.chars.alpha();
        self
    }

    pub fn numeric(mut self) -> Self {
        self.chars = self.chars.numeric();
        self
    }

    pub fn alphanumeric(mut self) -> Self {
        self.chars = self.chars.alphanumeric();
        self
    }

    pub fn ascii(mut self) -> Self {
        self.chars = self.chars.ascii();
        self
    }

    pub fn whitespace(mut self) -> Self {
        self.chars = self.chars.whitespace();
        self
    }

    pub fn with_chars(mut self, chars: &[char]) -> Self {
        self.chars = self.chars.with(chars);
        self
    }

    pub fn with_char_range(mut self, from: char, to: char) -> Self {
        self.chars = self.chars.range(from, to);
        self
    }

    /// No character occurs twice
    pub fn unique_chars(mut self) -> Self {
        self.unique = true;
        self
    }

    fn char_lists(&self) -> ListArbitrary<char> {
        let mut lists = self.chars.clone().list().of_min_size(self.min_length);
        if let Some(max_length) = self.max_length {
            lists = lists.of_max_size(max_length);
        }
        if self.unique {
            lists = lists.unique_elements();
        }
        lists
    }

    fn strings(&self) -> crate::arbitrary::Map<ListArbitrary<char>, String> {
        self.char_lists().map(|chars: Vec<char>| chars.into_iter().collect())
    }
}

impl Arbitrary for StringArbitrary {
    type Value = String;

    fn generator(&self, config: &GeneratorConfig) -> BoxedGenerator<String> {
        self.strings().generator(config)
    }

    fn generator_with_embedded_edge_cases(&self, config: &GeneratorConfig) -> BoxedGenerator<String> {
        self.strings().generator_with_embedded_edge_cases(config)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<String>> {
        self.strings().exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<String> {
        self.strings().edge_cases(max_edge_cases)
    }
}
