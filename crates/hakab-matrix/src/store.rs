//! Sparse contact store with two value channels and affine rescaling.
//!
//! ## Layout
//!
//! ```text
//! rows[i] = [Cell { column, probability, strength }, ...]   (insertion order)
//! ```
//!
//! Each row is an owned `Vec<Cell>`; columns are neither sorted nor
//! deduplicated. Lookup by column is a linear scan of the row.
//!
//! ## Effective values
//!
//! ```text
//! p_eff(i, j) = p(i, j) · prob_row_coefficient[i] · prob_column_coefficient[j]
//! s_eff(i, j) = s(i, j) + strength_row_offset[i]  + strength_column_offset[j]
//! ```
//!
//! Cells absent from a row are `(0, 0)` and stay `(0, 0)` under any
//! transform: offsets describe the edges an entity has, not edges it lacks.

use crate::config::MatrixConfig;
use crate::error::MatrixError;
use crate::manifest::ManifestMatrix;
use crate::Result;

// ─────────────────────────────────────────────
// Cell
// ─────────────────────────────────────────────

/// One listed entry of a row. Raw values, before any row/column transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub column:      usize,
    pub probability: f32,
    pub strength:    f32,
}

// ─────────────────────────────────────────────
// SparseMatrix
// ─────────────────────────────────────────────

/// Square `size × size` sparse matrix of `(probability, strength)` pairs.
///
/// A listed cell may still hold raw zeros; callers must not read "listed" as
/// "nonzero". [`nz_count`](Self::nz_count) counts listed cells.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    size:                     usize,
    rows:                     Vec<Vec<Cell>>,
    prob_row_coefficients:    Vec<f32>,
    prob_column_coefficients: Vec<f32>,
    strength_row_offsets:     Vec<f32>,
    strength_column_offsets:  Vec<f32>,
    nz_count:                 usize,
    row_capacity:             usize,
    law_probes:               usize,
}

impl SparseMatrix {
    /// Empty matrix over `size` indices with identity transforms.
    pub fn new(size: usize) -> Self {
        Self::with_config(size, &MatrixConfig::default())
    }

    pub fn with_config(size: usize, config: &MatrixConfig) -> Self {
        Self {
            size,
            rows:                     vec![Vec::new(); size],
            prob_row_coefficients:    vec![1.0; size],
            prob_column_coefficients: vec![1.0; size],
            strength_row_offsets:     vec![0.0; size],
            strength_column_offsets:  vec![0.0; size],
            nz_count:                 0,
            row_capacity:             config.row_capacity,
            law_probes:               config.law_probes,
        }
    }

    #[inline] pub fn size(&self) -> usize { self.size }
    #[inline] pub fn nz_count(&self) -> usize { self.nz_count }
    #[inline] pub(crate) fn law_probes(&self) -> usize { self.law_probes }

    /// Listed cells of `row`, in insertion order.
    pub fn row(&self, row: usize) -> Result<&[Cell]> {
        MatrixError::check_index(row, self.size)?;
        Ok(&self.rows[row])
    }

    pub fn row_len(&self, row: usize) -> Result<usize> {
        self.row(row).map(<[Cell]>::len)
    }

    /// Every listed cell in row-major, insertion order. This is the order in
    /// which [`manifest`](Self::manifest) consumes draws.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &Cell)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |cell| (i, cell)))
    }

    // ── Mutations ──────────────────────────────────────

    /// Append `columns.len()` cells to `row`.
    ///
    /// `probabilities` and `strengths` shorter than `columns` are padded with
    /// `0.0`; surplus trailing values are ignored. Every index is validated
    /// before the row is touched, so a failed call leaves the matrix as it was.
    /// Duplicate columns are appended, not merged.
    pub fn batch_set(
        &mut self,
        row:           usize,
        columns:       &[usize],
        probabilities: &[f32],
        strengths:     &[f32],
    ) -> Result<()> {
        if let Err(e) = self.validate_batch(row, columns) {
            tracing::debug!(row, len = columns.len(), error = %e, "rejected batch_set");
            return Err(e);
        }

        let cells = &mut self.rows[row];
        if cells.capacity() == 0 && self.row_capacity > 0 {
            cells.reserve(self.row_capacity.max(columns.len()));
        }
        cells.extend(columns.iter().enumerate().map(|(k, &column)| Cell {
            column,
            probability: probabilities.get(k).copied().unwrap_or(0.0),
            strength:    strengths.get(k).copied().unwrap_or(0.0),
        }));
        self.nz_count += columns.len();

        tracing::trace!(row, appended = columns.len(), nz_count = self.nz_count, "batch_set");
        Ok(())
    }

    fn validate_batch(&self, row: usize, columns: &[usize]) -> Result<()> {
        MatrixError::check_index(row, self.size)?;
        columns
            .iter()
            .try_for_each(|&c| MatrixError::check_index(c, self.size))
    }

    /// Scale every effective probability in `row` by `coff`.
    pub fn row_set_prob_coff(&mut self, row: usize, coff: f32) -> Result<()> {
        MatrixError::check_index(row, self.size)?;
        self.prob_row_coefficients[row] = coff;
        Ok(())
    }

    /// Scale every effective probability in `column` by `coff`.
    pub fn col_set_prob_coff(&mut self, column: usize, coff: f32) -> Result<()> {
        MatrixError::check_index(column, self.size)?;
        self.prob_column_coefficients[column] = coff;
        Ok(())
    }

    /// Shift every effective strength in `row` by `offset`.
    pub fn row_set_value_offset(&mut self, row: usize, offset: f32) -> Result<()> {
        MatrixError::check_index(row, self.size)?;
        self.strength_row_offsets[row] = offset;
        Ok(())
    }

    /// Shift every effective strength in `column` by `offset`.
    pub fn col_set_value_offset(&mut self, column: usize, offset: f32) -> Result<()> {
        MatrixError::check_index(column, self.size)?;
        self.strength_column_offsets[column] = offset;
        Ok(())
    }

    /// Restore identity transforms: all coefficients `1`, all offsets `0`.
    pub fn reset_transforms(&mut self) {
        self.prob_row_coefficients.fill(1.0);
        self.prob_column_coefficients.fill(1.0);
        self.strength_row_offsets.fill(0.0);
        self.strength_column_offsets.fill(0.0);
    }

    // ── Queries ────────────────────────────────────────

    /// Whether an explicit cell for `(row, column)` is listed.
    ///
    /// Says nothing about whether its effective values are zero.
    /// Out-of-range indices are simply not listed.
    pub fn has_value(&self, row: usize, column: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|cells| cells.iter().any(|c| c.column == column))
    }

    /// Effective `(probability, strength)` at `(row, column)`.
    ///
    /// With duplicate columns the first listed cell wins. Absent cells
    /// return `(0.0, 0.0)` regardless of offsets.
    pub fn get(&self, row: usize, column: usize) -> Result<(f32, f32)> {
        MatrixError::check_index(row, self.size)?;
        MatrixError::check_index(column, self.size)?;
        Ok(self.rows[row]
            .iter()
            .find(|c| c.column == column)
            .map_or((0.0, 0.0), |cell| self.effective(row, cell)))
    }

    #[inline]
    pub(crate) fn effective_probability(&self, row: usize, cell: &Cell) -> f32 {
        cell.probability
            * self.prob_row_coefficients[row]
            * self.prob_column_coefficients[cell.column]
    }

    #[inline]
    pub(crate) fn effective_strength(&self, row: usize, cell: &Cell) -> f32 {
        cell.strength
            + self.strength_row_offsets[row]
            + self.strength_column_offsets[cell.column]
    }

    #[inline]
    fn effective(&self, row: usize, cell: &Cell) -> (f32, f32) {
        (self.effective_probability(row, cell), self.effective_strength(row, cell))
    }

    /// Per-row probability that at least one `active` column transmits,
    /// without sampling:
    ///
    /// ```text
    /// prob_any[i] = 1 − Π_{j listed in i, active[j]} (1 − clamp(p_eff(i, j), 0, 1))
    /// ```
    pub fn prob_any(&self, active: &[bool]) -> Result<Vec<f32>> {
        MatrixError::check_len("active", self.size, active.len())?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                let escape: f32 = cells
                    .iter()
                    .filter(|c| active[c.column])
                    .map(|c| 1.0 - self.effective_probability(i, c).clamp(0.0, 1.0))
                    .product();
                1.0 - escape
            })
            .collect())
    }

    /// Sample which listed cells fire this tick.
    ///
    /// `draws` holds one value per listed cell in [`cells`](Self::cells)
    /// order; a cell fires iff `draw < p_eff`. The returned view borrows
    /// `self`, so the matrix cannot change while it is alive.
    pub fn manifest(&self, draws: &[f32]) -> Result<ManifestMatrix<'_>> {
        ManifestMatrix::new(self, draws)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> SparseMatrix {
        let mut m = SparseMatrix::new(3);
        m.batch_set(0, &[1, 2], &[0.5, 0.9], &[2.0, 3.0]).unwrap();
        m
    }

    #[test]
    fn empty_matrix_has_no_cells() {
        let m = SparseMatrix::new(4);
        assert_eq!(m.size(), 4);
        assert_eq!(m.nz_count(), 0);
        assert_eq!(m.cells().count(), 0);
    }

    #[test]
    fn batch_set_lists_every_column() {
        let m = scenario();
        assert_eq!(m.nz_count(), 2);
        assert!(m.has_value(0, 1));
        assert!(m.has_value(0, 2));
        assert!(!m.has_value(0, 0));
        assert!(!m.has_value(1, 1));
        assert_eq!(m.get(0, 1).unwrap(), (0.5, 2.0));
        assert_eq!(m.get(0, 2).unwrap(), (0.9, 3.0));
    }

    #[test]
    fn short_channels_pad_with_zero() {
        let mut m = SparseMatrix::new(4);
        m.batch_set(1, &[0, 2, 3], &[0.7], &[]).unwrap();
        assert_eq!(m.nz_count(), 3);
        assert_eq!(m.get(1, 0).unwrap(), (0.7, 0.0));
        assert_eq!(m.get(1, 2).unwrap(), (0.0, 0.0));
        assert!(m.has_value(1, 3));
    }

    #[test]
    fn surplus_channel_values_are_ignored() {
        let mut m = SparseMatrix::new(2);
        m.batch_set(0, &[1], &[0.3, 0.4, 0.5], &[1.0, 9.0]).unwrap();
        assert_eq!(m.nz_count(), 1);
        assert_eq!(m.row(0).unwrap().len(), 1);
    }

    #[test]
    fn out_of_range_row_is_rejected() {
        let mut m = SparseMatrix::new(3);
        let err = m.batch_set(3, &[0], &[1.0], &[1.0]).unwrap_err();
        assert_eq!(err, MatrixError::IndexOutOfRange { index: 3, size: 3 });
        assert_eq!(m.nz_count(), 0);
    }

    #[test]
    fn failed_batch_is_atomic() {
        let mut m = scenario();
        let err = m.batch_set(1, &[0, 1, 7], &[1.0; 3], &[1.0; 3]).unwrap_err();
        assert_eq!(err, MatrixError::IndexOutOfRange { index: 7, size: 3 });
        assert_eq!(m.nz_count(), 2);
        assert_eq!(m.row_len(1).unwrap(), 0);
        assert!(!m.has_value(1, 0));
    }

    #[test]
    fn repeated_batches_append() {
        let mut m = scenario();
        m.batch_set(0, &[0], &[0.1], &[0.2]).unwrap();
        m.batch_set(0, &[1], &[0.8], &[5.0]).unwrap();
        assert_eq!(m.nz_count(), 4);
        assert_eq!(m.row_len(0).unwrap(), 4);
        // first listed duplicate wins on lookup
        assert_eq!(m.get(0, 1).unwrap(), (0.5, 2.0));
    }

    #[test]
    fn absent_cell_ignores_offsets() {
        let mut m = scenario();
        m.row_set_value_offset(0, 4.0).unwrap();
        m.col_set_value_offset(0, 1.5).unwrap();
        for _ in 0..3 {
            assert_eq!(m.get(0, 0).unwrap(), (0.0, 0.0));
        }
    }

    #[test]
    fn get_out_of_range_errors() {
        let m = scenario();
        assert!(matches!(m.get(0, 3), Err(MatrixError::IndexOutOfRange { index: 3, .. })));
        assert!(matches!(m.get(5, 0), Err(MatrixError::IndexOutOfRange { index: 5, .. })));
        assert!(!m.has_value(5, 0));
    }

    #[test]
    fn transforms_apply_per_row_and_column() {
        let mut m = scenario();
        m.row_set_prob_coff(0, 0.5).unwrap();
        m.col_set_prob_coff(2, 0.5).unwrap();
        m.row_set_value_offset(0, 1.0).unwrap();
        m.col_set_value_offset(1, -0.5).unwrap();

        let (p1, s1) = m.get(0, 1).unwrap();
        let (p2, s2) = m.get(0, 2).unwrap();
        assert!((p1 - 0.25).abs() < 1e-6);
        assert!((s1 - 2.5).abs() < 1e-6);
        assert!((p2 - 0.225).abs() < 1e-6);
        assert!((s2 - 4.0).abs() < 1e-6);
    }

    #[test]
    fn identity_transforms_return_raw_values() {
        let mut m = scenario();
        m.row_set_prob_coff(0, 0.3).unwrap();
        m.row_set_value_offset(0, 2.0).unwrap();
        m.row_set_prob_coff(0, 1.0).unwrap();
        m.row_set_value_offset(0, 0.0).unwrap();
        assert_eq!(m.get(0, 1).unwrap(), (0.5, 2.0));
        assert_eq!(m.get(0, 2).unwrap(), (0.9, 3.0));
    }

    #[test]
    fn reset_transforms_restores_identity() {
        let mut m = scenario();
        m.row_set_prob_coff(0, 0.0).unwrap();
        m.col_set_prob_coff(1, 3.0).unwrap();
        m.row_set_value_offset(0, 9.0).unwrap();
        m.col_set_value_offset(2, 9.0).unwrap();
        m.reset_transforms();
        assert_eq!(m.get(0, 1).unwrap(), (0.5, 2.0));
        assert_eq!(m.get(0, 2).unwrap(), (0.9, 3.0));
    }

    #[test]
    fn setters_reject_out_of_range() {
        let mut m = SparseMatrix::new(2);
        assert!(m.row_set_prob_coff(2, 1.0).is_err());
        assert!(m.col_set_prob_coff(2, 1.0).is_err());
        assert!(m.row_set_value_offset(2, 1.0).is_err());
        assert!(m.col_set_value_offset(2, 1.0).is_err());
    }

    #[test]
    fn cells_follow_row_major_insertion_order() {
        let mut m = SparseMatrix::new(3);
        m.batch_set(2, &[0], &[0.1], &[0.0]).unwrap();
        m.batch_set(0, &[2, 1], &[0.2, 0.3], &[0.0, 0.0]).unwrap();
        let order: Vec<(usize, usize)> = m.cells().map(|(i, c)| (i, c.column)).collect();
        assert_eq!(order, vec![(0, 2), (0, 1), (2, 0)]);
    }

    #[test]
    fn row_capacity_is_reserved() {
        let cfg = MatrixConfig { row_capacity: 32, ..MatrixConfig::default() };
        let mut m = SparseMatrix::with_config(2, &cfg);
        m.batch_set(0, &[1], &[0.5], &[1.0]).unwrap();
        assert!(m.rows[0].capacity() >= 32);
    }

    #[test]
    fn prob_any_combines_active_columns() {
        let m = scenario();
        let p = m.prob_any(&[false, true, true]).unwrap();
        // 1 − (1 − 0.5)(1 − 0.9) = 0.95
        assert!((p[0] - 0.95).abs() < 1e-6);
        assert_eq!(p[1], 0.0);

        let only_one = m.prob_any(&[false, true, false]).unwrap();
        assert!((only_one[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn prob_any_clamps_scaled_probabilities() {
        let mut m = scenario();
        m.row_set_prob_coff(0, 4.0).unwrap();
        let p = m.prob_any(&[true, true, false]).unwrap();
        assert!((p[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn prob_any_length_mismatch() {
        let m = scenario();
        assert!(matches!(
            m.prob_any(&[true]),
            Err(MatrixError::LengthMismatch { expected: 3, got: 1, .. })
        ));
    }
}
