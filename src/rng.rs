use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of uniformly distributed integers used by the ticket shuffle
/// and the prize draws. Implementations are infallible; the trait exists
/// so that selection algorithms are deterministic under test.
pub trait RandomSource {
    /// Next unbounded non-negative integer.
    fn next(&mut self) -> u64;

    /// Uniform draw from `[0, max)`. `max` must be greater than zero.
    fn next_below(&mut self, max: u64) -> u64;

    /// Uniform draw from `[min, max)`. `min` must be less than `max`.
    fn next_range(&mut self, min: u64, max: u64) -> u64;
}

/// Production source backed by a ChaCha8 stream. Seedable for
/// reproducible rounds.
pub struct ChaChaSource(ChaCha8Rng);

impl ChaChaSource {
    pub fn from_u64_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl RandomSource for ChaChaSource {
    fn next(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn next_below(&mut self, max: u64) -> u64 {
        self.0.gen_range(0..max)
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        self.0.gen_range(min..max)
    }
}

/// Replays a fixed sequence of values, reducing bounded draws by modulo.
/// Intended for tests that need full control over every draw; panics when
/// the script runs out.
pub struct ScriptedSource {
    values: VecDeque<u64>,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn next(&mut self) -> u64 {
        self.values.pop_front().expect("scripted source exhausted")
    }

    fn next_below(&mut self, max: u64) -> u64 {
        self.next() % max
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        min + self.next() % (max - min)
    }
}
