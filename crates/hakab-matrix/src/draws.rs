//! Uniform `[0, 1)` draw streams for [`SparseMatrix::manifest`].
//!
//! The manifestation engine takes draws as plain data; this module is the
//! stock way to produce them. Seeded sources replay identically.

use rand::{Rng, RngCore, SeedableRng};

use crate::config::MatrixConfig;
use crate::manifest::ManifestMatrix;
use crate::store::SparseMatrix;
use crate::Result;

/// Source of uniform draws, optionally seeded for reproducibility.
pub struct DrawSource {
    rng:  Box<dyn RngCore>,
    seed: Option<u64>,
}

impl DrawSource {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Box::new(rand::rngs::StdRng::seed_from_u64(seed)), seed: Some(seed) }
    }

    pub fn thread() -> Self {
        Self { rng: Box::new(rand::thread_rng()), seed: None }
    }

    /// Seeded when `config.draw_seed` is set, thread RNG otherwise.
    pub fn from_config(config: &MatrixConfig) -> Self {
        match config.draw_seed {
            Some(s) => Self::seeded(s),
            None    => Self::thread(),
        }
    }

    #[inline] pub fn seed(&self) -> Option<u64> { self.seed }

    /// `n` independent uniform draws in `[0, 1)`.
    pub fn draws(&mut self, n: usize) -> Vec<f32> {
        (0..n).map(|_| self.rng.gen::<f32>()).collect()
    }

    /// One draw per listed cell of `matrix`.
    pub fn draws_for(&mut self, matrix: &SparseMatrix) -> Vec<f32> {
        self.draws(matrix.nz_count())
    }
}

impl std::fmt::Debug for DrawSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawSource").field("seed", &self.seed).finish_non_exhaustive()
    }
}

impl SparseMatrix {
    /// [`manifest`](Self::manifest) with draws pulled from `source`.
    pub fn manifest_with(&self, source: &mut DrawSource) -> Result<ManifestMatrix<'_>> {
        let draws = source.draws_for(self);
        self.manifest(&draws)
    }
}
