//! Deterministic random number generation for weight initialisation.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical weight tables
//! - **Forkable**: Each n-tuple draws from its own stream, so the values of
//!   one table do not depend on how many weights the previous tables had
//!
//! ```
//! use ntuple_td::core::WeightRng;
//!
//! let mut rng = WeightRng::new(42);
//! let mut tuple_rng = rng.fork();
//!
//! let mut again = WeightRng::new(42);
//! let mut tuple_again = again.fork();
//! assert_eq!(tuple_rng.uniform(0.5), tuple_again.uniform(0.5));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded ChaCha8 stream with deterministic forking.
#[derive(Clone, Debug)]
pub struct WeightRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl WeightRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork an independent, deterministic child stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self::new(fork_seed)
    }

    /// Uniform sample from `[-scale, scale]`.
    ///
    /// A zero scale always yields `0.0`. Sampled on the unit interval and
    /// scaled, so any finite `scale` stays finite.
    pub fn uniform(&mut self, scale: f64) -> f64 {
        if scale == 0.0 {
            return 0.0;
        }
        scale * self.inner.gen_range(-1.0f64..=1.0)
    }
}
