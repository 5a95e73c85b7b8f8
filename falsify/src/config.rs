//! Configuration types for generation, edge cases and shrinking.

use std::fmt;

/// Default number of misses a filter or uniqueness constraint tolerates
pub const DEFAULT_MAX_MISSES: usize = 10_000;

/// Default cap on the number of edge cases an arbitrary offers
pub const DEFAULT_MAX_EDGE_CASES: usize = 1000;

/// Maximum number of nested attempts when searching past filtered-out shrink candidates
pub const MAX_FILTER_SEARCH_DEPTH: usize = 100;

/// Default upper size for containers without an explicit maximum
pub const DEFAULT_COLLECTION_SIZE: usize = 255;

/// Default number of shrinking attempts in [`ShrinkingMode::Bounded`]
pub const DEFAULT_BOUNDED_SHRINKING_ATTEMPTS: usize = 10_000;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid number of tries (must be > 0)
    InvalidTries(usize),
    /// Invalid generation size (must be > 0)
    InvalidGenSize(usize),
    /// Invalid max depth (must be > 0)
    InvalidMaxDepth(usize),
    /// Invalid number of bounded shrinking attempts (must be > 0)
    InvalidShrinkingAttempts(usize),
    /// Invalid discard ratio (must be > 0)
    InvalidDiscardRatio(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTries(n) => write!(f, "Invalid tries count: {} (must be > 0)", n),
            ConfigError::InvalidGenSize(n) => {
                write!(f, "Invalid generation size: {} (must be > 0)", n)
            }
            ConfigError::InvalidMaxDepth(n) => {
                write!(f, "Invalid max depth: {} (must be > 0)", n)
            }
            ConfigError::InvalidShrinkingAttempts(n) => {
                write!(f, "Invalid bounded shrinking attempts: {} (must be > 0)", n)
            }
            ConfigError::InvalidDiscardRatio(n) => {
                write!(f, "Invalid max discard ratio: {} (must be > 0)", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// How edge cases are mixed into randomized generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeCasesMode {
    /// Try all combinations of edge cases before any random value
    First,
    /// Edge cases appear with raised frequency among random values
    #[default]
    Mixin,
    /// No edge cases at all
    None,
}

impl EdgeCasesMode {
    /// Whether edge cases are generated at all
    pub fn activated(&self) -> bool {
        !matches!(self, EdgeCasesMode::None)
    }

    /// Whether all edge case combinations come before random values
    pub fn generate_first(&self) -> bool {
        matches!(self, EdgeCasesMode::First)
    }

    /// Whether edge cases are interleaved with random values
    pub fn mix_in(&self) -> bool {
        matches!(self, EdgeCasesMode::Mixin)
    }
}

/// How parameter values are produced for a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum GenerationMode {
    /// Exhaustive if every parameter can enumerate within the try budget, random otherwise
    #[default]
    Auto,
    /// Random values, optionally mixed with edge cases
    Randomized,
    /// Every combination of every parameter's values
    Exhaustive,
    /// Explicitly supplied tuples of values
    DataDriven,
}

/// How far shrinking goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum ShrinkingMode {
    /// Report the original falsified sample
    Off,
    /// Stop after a fixed number of shrinking attempts
    #[default]
    Bounded,
    /// Shrink until no strategy finds an improvement
    Full,
}

/// Configuration handed to every generator factory
///
/// The configuration is passed explicitly through all combinators; nested generators
/// derive their own configuration with [`GeneratorConfig::deeper`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    /// Size hint for generated values; also drives edge case frequency
    pub gen_size: usize,
    /// Maximum nesting for recursive arbitraries
    pub max_depth: usize,
    /// Current nesting level
    pub depth: usize,
    /// Whether generators embed their edge cases among random values
    pub with_edge_cases: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            gen_size: 1000,
            max_depth: 10,
            depth: 0,
            with_edge_cases: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator configuration with validation
    pub fn new(gen_size: usize, max_depth: usize, with_edge_cases: bool) -> Result<Self, ConfigError> {
        let config = Self {
            gen_size,
            max_depth,
            depth: 0,
            with_edge_cases,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gen_size == 0 {
            return Err(ConfigError::InvalidGenSize(self.gen_size));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        Ok(())
    }

    /// Configuration for one level of recursion further down
    pub fn deeper(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Whether recursive arbitraries have used up their depth budget
    pub fn depth_exhausted(&self) -> bool {
        self.depth >= self.max_depth
    }

    /// Same configuration with a different size hint
    pub fn with_gen_size(&self, gen_size: usize) -> Self {
        Self {
            gen_size,
            ..self.clone()
        }
    }

    /// Same configuration with edge case embedding switched on or off
    pub fn embedding_edge_cases(&self, with_edge_cases: bool) -> Self {
        Self {
            with_edge_cases,
            ..self.clone()
        }
    }
}

/// Configuration for one property check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// Number of tries the caller grants this property
    pub tries: usize,
    /// Optional seed for reproducible runs
    pub seed: Option<u64>,
    /// Size hint, defaults to the number of tries
    pub gen_size: Option<usize>,
    /// Maximum ratio of discarded to checked tries
    pub max_discard_ratio: usize,
    /// Edge case mixing
    pub edge_cases: EdgeCasesMode,
    /// Generation mode
    pub generation: GenerationMode,
    /// Shrinking mode
    pub shrinking: ShrinkingMode,
    /// Attempt budget for bounded shrinking
    pub bounded_shrinking_attempts: usize,
    /// Maximum nesting for recursive arbitraries
    pub max_depth: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            tries: 1000,
            seed: None,
            gen_size: None,
            max_discard_ratio: 5,
            edge_cases: EdgeCasesMode::default(),
            generation: GenerationMode::default(),
            shrinking: ShrinkingMode::default(),
            bounded_shrinking_attempts: DEFAULT_BOUNDED_SHRINKING_ATTEMPTS,
            max_depth: 10,
        }
    }
}

impl CheckConfig {
    /// Validate the check configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tries == 0 {
            return Err(ConfigError::InvalidTries(self.tries));
        }
        if let Some(gen_size) = self.gen_size
            && gen_size == 0
        {
            return Err(ConfigError::InvalidGenSize(gen_size));
        }
        if self.max_discard_ratio == 0 {
            return Err(ConfigError::InvalidDiscardRatio(self.max_discard_ratio));
        }
        if self.bounded_shrinking_attempts == 0 {
            return Err(ConfigError::InvalidShrinkingAttempts(
                self.bounded_shrinking_attempts,
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        Ok(())
    }

    /// Set the number of tries
    pub fn with_tries(mut self, tries: usize) -> Self {
        self.tries = tries;
        self
    }

    /// Set a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the size hint
    pub fn with_gen_size(mut self, gen_size: usize) -> Self {
        self.gen_size = Some(gen_size);
        self
    }

    /// Set the edge case mode
    pub fn with_edge_cases(mut self, mode: EdgeCasesMode) -> Self {
        self.edge_cases = mode;
        self
    }

    /// Set the generation mode
    pub fn with_generation(mut self, mode: GenerationMode) -> Self {
        self.generation = mode;
        self
    }

    /// Set the shrinking mode
    pub fn with_shrinking(mut self, mode: ShrinkingMode) -> Self {
        self.shrinking = mode;
        self
    }

    /// Set the maximum discard ratio
    pub fn with_max_discard_ratio(mut self, ratio: usize) -> Self {
        self.max_discard_ratio = ratio;
        self
    }

    /// Effective size hint
    pub fn effective_gen_size(&self) -> usize {
        self.gen_size.unwrap_or(self.tries)
    }

    /// Generator configuration derived from this check configuration
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            gen_size: self.effective_gen_size(),
            max_depth: self.max_depth,
            depth: 0,
            with_edge_cases: self.edge_cases.activated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_config_defaults() {
        let config = CheckConfig::default();
        assert_eq!(config.tries, 1000);
        assert_eq!(config.max_discard_ratio, 5);
        assert_eq!(config.edge_cases, EdgeCasesMode::Mixin);
        assert_eq!(config.generation, GenerationMode::Auto);
        assert_eq!(config.shrinking, ShrinkingMode::Bounded);
        assert_eq!(config.bounded_shrinking_attempts, 10_000);
        assert_eq!(config.effective_gen_size(), 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_check_config_validation() {
        assert_eq!(
            CheckConfig::default().with_tries(0).validate(),
            Err(ConfigError::InvalidTries(0))
        );
        assert_eq!(
            CheckConfig::default().with_gen_size(0).validate(),
            Err(ConfigError::InvalidGenSize(0))
        );
        assert_eq!(
            CheckConfig::default().with_max_discard_ratio(0).validate(),
            Err(ConfigError::InvalidDiscardRatio(0))
        );
    }

    #[test]
    fn test_generator_config_derivation() {
        let config = CheckConfig::default()
            .with_tries(50)
            .with_edge_cases(EdgeCasesMode::None);
        let generator_config = config.generator_config();
        assert_eq!(generator_config.gen_size, 50);
        assert!(!generator_config.with_edge_cases);

        let deeper = generator_config.deeper().deeper();
        assert_eq!(deeper.depth, 2);
        assert!(!deeper.depth_exhausted());
    }

    #[test]
    fn test_generator_config_validation() {
        assert!(GeneratorConfig::new(100, 5, true).is_ok());
        assert_eq!(
            GeneratorConfig::new(0, 5, true),
            Err(ConfigError::InvalidGenSize(0))
        );
        assert_eq!(
            GeneratorConfig::new(10, 0, true),
            Err(ConfigError::InvalidMaxDepth(0))
        );
    }

    #[test]
    fn test_edge_cases_mode_flags() {
        assert!(EdgeCasesMode::First.generate_first());
        assert!(EdgeCasesMode::Mixin.mix_in());
        assert!(!EdgeCasesMode::None.activated());
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidTries(0).to_string(),
            "Invalid tries count: 0 (must be > 0)"
        );
    }
}
