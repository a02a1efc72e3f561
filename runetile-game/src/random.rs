//! Random sources injected into the task generators.
//!
//! Production play draws from [`ThreadRandom`]; tests and the tester binary
//! use [`SeededRandom`] so runs replay exactly. Daily challenges never touch a
//! stream and instead hash their seed string with [`seeded_fraction`].
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::numbers::{fraction_in_range, fraction_to_index};

/// Source of unit fractions in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index into a collection of `len` items.
    fn pick_index(&mut self, len: usize) -> usize {
        fraction_to_index(self.next_f64(), len)
    }

    /// Uniform integer in `[min, max]`.
    fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        fraction_in_range(self.next_f64(), min, max)
    }

    /// Index chosen proportionally to `weights`; uniform when all are zero.
    fn weighted_index(&mut self, weights: &[u32]) -> usize {
        let total: u64 = weights.iter().map(|weight| u64::from(*weight)).sum();
        if total == 0 {
            return self.pick_index(weights.len());
        }
        let total_len = usize::try_from(total).unwrap_or(usize::MAX);
        let roll = u64::try_from(self.pick_index(total_len)).unwrap_or(0);
        let mut cursor = 0_u64;
        for (idx, weight) in weights.iter().enumerate() {
            cursor = cursor.saturating_add(u64::from(*weight));
            if roll < cursor {
                return idx;
            }
        }
        weights.len().saturating_sub(1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Entropy-seeded generator for live play.
#[derive(Debug, Clone)]
pub struct ThreadRandom {
    rng: SmallRng,
}

impl ThreadRandom {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Reproducible generator for tests and simulations.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha20Rng,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Independent sub-stream for `tag`, stable for a given seed.
    #[must_use]
    pub fn stream(seed: u64, tag: &[u8]) -> Self {
        Self::new(derive_stream_seed(seed, tag))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Deterministic unit fraction for a seed string.
///
/// Folds the UTF-16 code units through a wrapping 32-bit `h * 31 + c` hash and
/// scales the magnitude by `i32::MAX`. The mapping is shared with every other
/// client of the daily challenge, so it must not change.
#[must_use]
pub fn seeded_fraction(seed: &str) -> f64 {
    let hash = seed.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    f64::from(hash.unsigned_abs()) / f64::from(i32::MAX)
}
