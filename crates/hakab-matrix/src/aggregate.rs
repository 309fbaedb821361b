//! Per-row aggregation of an external signal over fired edges (`I_POA`).
//!
//! ```text
//! out[i] = Π_{j fired in row i, j ∈ signal}  combine(s_eff(i, j), signal[j])
//! ```
//!
//! The empty product is `1.0`, so rows without a matching fired edge write
//! the neutral value. Fold order is row insertion order; operators that are
//! not associative and commutative give an order-dependent result.

use crate::combine::{verify_zero_law, Combine};
use crate::error::MatrixError;
use crate::manifest::ManifestMatrix;
use crate::Result;

impl<'a> ManifestMatrix<'a> {
    /// Aggregate the sparse signal `(values[k], indices[k])` into a fresh
    /// vector of length [`size`](Self::size).
    pub fn i_poa<C>(&self, values: &[f32], indices: &[usize], op: &C) -> Result<Vec<f32>>
    where
        C: Combine + ?Sized,
    {
        let mut out = vec![1.0f32; self.size()];
        self.i_poa_into(values, indices, op, &mut out)?;
        Ok(out)
    }

    /// Aggregate into a caller-provided buffer of length [`size`](Self::size).
    ///
    /// Signal indices may come in any order. A repeated index keeps its last
    /// value. On error `out` is left untouched.
    pub fn i_poa_into<C>(
        &self,
        values:  &[f32],
        indices: &[usize],
        op:      &C,
        out:     &mut [f32],
    ) -> Result<()>
    where
        C: Combine + ?Sized,
    {
        let size = self.size();
        MatrixError::check_len("indices", values.len(), indices.len())?;
        MatrixError::check_len("out", size, out.len())?;
        indices
            .iter()
            .try_for_each(|&j| MatrixError::check_index(j, size))?;
        debug_assert_eq!(verify_zero_law(op, self.origin().law_probes()), Ok(()));

        let mut signal: Vec<Option<f32>> = vec![None; size];
        for (&v, &j) in values.iter().zip(indices) {
            signal[j] = Some(v);
        }

        let origin = self.origin();
        let mut touched = 0usize;
        for (i, slot) in out.iter_mut().enumerate() {
            let mut acc = 1.0f32;
            let mut matched = false;
            for cell in self.fired_cells(i) {
                if let Some(v) = signal[cell.column] {
                    acc *= op.combine(origin.effective_strength(i, cell), v);
                    matched = true;
                }
            }
            touched += usize::from(matched);
            *slot = acc;
        }

        tracing::debug!(rows = size, signal = values.len(), touched, "i_poa");
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
