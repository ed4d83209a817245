//! Seeded randomness shared by board generation, the deck, dice and thefts.
//!
//! Every random draw in a game goes through a single `RandomSource`, so a seed
//! plus the sequence of commands reproduces the game exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Deterministic random stream for one game
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    rng: StdRng,
}

impl RandomSource {
    /// Create a source from an optional seed, falling back to the clock
    pub fn new(seed: Option<u64>) -> Self {
        Self::from_seed(seed.unwrap_or_else(clock_seed))
    }

    /// Create a source from an explicit seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Roll one six-sided die
    pub fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    /// Roll two six-sided dice
    pub fn roll_dice(&mut self) -> (u8, u8) {
        let first = self.roll_die();
        let second = self.roll_die();
        (first, second)
    }

    /// Pick one element uniformly, `None` for an empty slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
