//! Source of randomness for generation and seeded regeneration.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Trait for providing random number generators
pub trait RngProvider: Send + Sync {
    /// The type of RNG this provider creates
    type Rng: RngCore + Send;

    /// Create a new RNG instance with an optional seed
    fn create_rng(&self, seed: Option<u64>) -> Self::Rng;
}

/// Default RNG provider using `StdRng`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRngProvider;

impl RngProvider for DefaultRngProvider {
    type Rng = StdRng;

    fn create_rng(&self, seed: Option<u64>) -> Self::Rng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// The random source of one property run.
///
/// Remembers the seed it was created from so a failing run can be reported and replayed.
/// Nested regeneration (flat-mapped values) uses seeds drawn from this source, which
/// keeps the whole run reproducible from the single top-level seed.
#[derive(Debug, Clone)]
pub struct SourceOfRandomness {
    seed: u64,
    rng: StdRng,
}

impl SourceOfRandomness {
    /// Create a source from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: DefaultRngProvider.create_rng(Some(seed)),
        }
    }

    /// Create a source from a fresh random seed
    pub fn random() -> Self {
        let seed = DefaultRngProvider.create_rng(None).r#gen();
        Self::seeded(seed)
    }

    /// Use `seed` if given, a fresh random seed otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::random, Self::seeded)
    }

    /// The seed this source started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a seed for an independent, reproducible sub-stream
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// An independent source seeded from this one
    pub fn split(&mut self) -> SourceOfRandomness {
        SourceOfRandomness::seeded(self.next_seed())
    }

    /// Mutable access for generators
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}

impl RngCore for SourceOfRandomness {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// A fresh `StdRng` for regenerating a value from a recorded seed
pub fn rng_for_seed(seed: u64) -> StdRng {
    DefaultRngProvider.create_rng(Some(seed))
}
