//! Injectable random sources for action selection.
//!
//! # Example
//!
//! ```
//! use navprobe::rng::{RandomSource, Seed, SeededRandom};
//!
//! let mut a = SeededRandom::new(Seed::from_u64(42));
//! let mut b = SeededRandom::new(Seed::from_u64(42));
//! assert_eq!(a.next_index(5), b.next_index(5));
//! ```

use serde::{Deserialize, Serialize};

/// Deterministic seed for reproducible runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Seed(u64);

impl Seed {
    /// Create a seed from a u64 value
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw seed value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Source of choices for the test generator
pub trait RandomSource {
    /// Index in `0..len`. Callers never pass `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Simple xorshift64 PRNG
#[derive(Debug, Clone)]
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const fn new(seed: Seed) -> Self {
        // Ensure non-zero state
        let state = if seed.0 == 0 { 1 } else { seed.0 };
        Self { state }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Seeded pseudo-random source; same seed, same choices
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Xorshift64,
    seed: Seed,
    draws: u64,
}

impl SeededRandom {
    /// Create a new source with the given seed
    #[must_use]
    pub const fn new(seed: Seed) -> Self {
        Self {
            rng: Xorshift64::new(seed),
            seed,
            draws: 0,
        }
    }

    /// Seed this source was created with
    #[must_use]
    pub const fn seed(&self) -> Seed {
        self.seed
    }

    /// Number of choices drawn so far
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.draws += 1;
        (self.rng.next() % len as u64) as usize
    }
}

/// Replays a fixed list of choices, then keeps choosing the first option.
///
/// Useful for reproducing a specific path. Indices are clamped to the
/// available range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChoices {
    choices: Vec<usize>,
    position: usize,
}

impl ScriptedChoices {
    /// Create a source replaying `choices`
    #[must_use]
    pub fn new(choices: impl Into<Vec<usize>>) -> Self {
        Self {
            choices: choices.into(),
            position: 0,
        }
    }

    /// Source that always takes the first option
    #[must_use]
    pub fn first() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedChoices {
    fn next_index(&mut self, len: usize) -> usize {
        let choice = self.choices.get(self.position).copied().unwrap_or(0);
        self.position += 1;
        choice.min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}
