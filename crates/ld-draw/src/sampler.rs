//! Draw sampler — uniform selection without replacement

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use ld_core::Participant;

/// Random selector behind both the rolling preview and the committed draw
///
/// Visual fairness only: a seeded ChaCha stream is fine and makes
/// rehearsals reproducible.
pub struct DrawSampler {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl DrawSampler {
    /// Create a sampler, seeded for reproducible runs or from OS entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self { rng, seed }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Seed used at construction, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Restart the stream from a new seed
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = Some(seed);
    }

    /// Pick `min(k, pool.len())` distinct participants
    ///
    /// Every participant is equally likely to land in every position.
    pub fn sample(&mut self, pool: &[Participant], k: usize) -> Vec<Participant> {
        self.sample_indices(pool.len(), k)
            .into_iter()
            .map(|i| pool[i].clone())
            .collect()
    }

    /// Partial Fisher–Yates over `0..n`, returning the first `min(k, n)` picks
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        let k = k.min(n);
        let mut indices: Vec<usize> = (0..n).collect();
        for i in 0..k {
            let j = self.rng.random_range(i..n);
            indices.swap(i, j);
        }
        indices.truncate(k);
        indices
    }
}

impl Default for DrawSampler {
    fn default() -> Self {
        Self::new(None)
    }
}
