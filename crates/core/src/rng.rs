//! Seeded random stream shared by generation, spawning, and enemy movement.
//! This module exists so every random decision in a level flows through one countable stream.
//! It does not decide what the draws mean; callers own their own ranges.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

const WORDS_PER_DRAW: u128 = 2;

pub struct GameRng {
    seed: u64,
    draws: u64,
    inner: ChaCha8Rng,
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self { seed, draws: 0, inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Rebuilds a stream positioned after `draws` values, as recorded by a snapshot.
    ///
    /// Every draw consumes two 32-bit words, so this seeks instead of replaying.
    pub fn resume(seed: u64, draws: u64) -> Self {
        let mut rng = Self::seeded(seed);
        rng.inner.set_word_pos(u128::from(draws) * WORDS_PER_DRAW);
        rng.draws = draws;
        rng
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.wrapping_add(1);
        self.inner.next_u64()
    }

    /// Uniform-ish value in `0..bound`; `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        (self.next_u64() % bound as u64) as usize
    }

    pub fn coin(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// Fisher-Yates from the back, one draw per swap.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
