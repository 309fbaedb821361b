//! Stochastic realisation of a [`SparseMatrix`] for one tick.
//!
//! Each listed cell consumes one externally supplied draw and fires iff
//! `draw < p_eff`. The engine never samples on its own; reproducible runs
//! inject a literal draw array (or a seeded [`DrawSource`](crate::DrawSource)).
//!
//! Fired flags are stored flat, CSR-style: row `i` owns
//! `fired[offsets[i]..offsets[i + 1]]`, parallel to the row's cells.

use std::ops::Range;

use crate::error::MatrixError;
use crate::store::{Cell, SparseMatrix};
use crate::Result;

// ─────────────────────────────────────────────
// ManifestMatrix
// ─────────────────────────────────────────────

/// Boolean "which edges fired" mask over a borrowed [`SparseMatrix`].
///
/// Strengths are read through the origin at query time, so the origin is
/// borrowed for `'a` and cannot be mutated while the manifest lives.
#[derive(Debug, Clone)]
pub struct ManifestMatrix<'a> {
    origin:  &'a SparseMatrix,
    /// Row offsets into `fired`, length = size + 1.
    offsets: Vec<usize>,
    /// One flag per listed cell, row-major insertion order.
    fired:   Vec<bool>,
    fired_count: usize,
}

impl<'a> ManifestMatrix<'a> {
    pub(crate) fn new(origin: &'a SparseMatrix, draws: &[f32]) -> Result<Self> {
        if let Err(e) = MatrixError::check_len("draws", origin.nz_count(), draws.len()) {
            tracing::debug!(error = %e, "rejected manifest");
            return Err(e);
        }

        let mut offsets = Vec::with_capacity(origin.size() + 1);
        offsets.push(0usize);
        for i in 0..origin.size() {
            let len = origin.row(i)?.len();
            offsets.push(offsets[i] + len);
        }

        // NaN draws compare false and never fire.
        let fired: Vec<bool> = origin
            .cells()
            .zip(draws)
            .map(|((i, cell), &draw)| draw < origin.effective_probability(i, cell))
            .collect();
        let fired_count = fired.iter().filter(|&&f| f).count();

        tracing::debug!(
            size = origin.size(),
            listed = fired.len(),
            fired = fired_count,
            "manifested"
        );

        Ok(Self { origin, offsets, fired, fired_count })
    }

    /// The matrix this manifest was sampled from.
    #[inline] pub fn origin(&self) -> &'a SparseMatrix { self.origin }
    #[inline] pub fn size(&self) -> usize { self.origin.size() }
    /// Number of listed cells that fired.
    #[inline] pub fn fired_count(&self) -> usize { self.fired_count }

    #[inline]
    fn span(&self, row: usize) -> Range<usize> {
        self.offsets[row]..self.offsets[row + 1]
    }

    /// Fired cells of `row` (unchecked index), in insertion order.
    pub(crate) fn fired_cells(&self, row: usize) -> impl Iterator<Item = &'a Cell> + '_ {
        let cells: &'a [Cell] = self.origin.row(row).unwrap_or(&[]);
        cells
            .iter()
            .zip(&self.fired[self.span(row)])
            .filter_map(|(cell, &fired)| fired.then_some(cell))
    }

    /// Effective strength at `(row, column)` if a listed cell there fired,
    /// else `0.0`. Unlisted cells are `0.0` as well.
    ///
    /// With duplicate columns the first *fired* duplicate is reported.
    pub fn get(&self, row: usize, column: usize) -> Result<f32> {
        MatrixError::check_index(row, self.size())?;
        MatrixError::check_index(column, self.size())?;
        Ok(self
            .fired_cells(row)
            .find(|c| c.column == column)
            .map_or(0.0, |cell| self.origin.effective_strength(row, cell)))
    }

    /// Whether any listed cell at `(row, column)` fired.
    /// Out-of-range indices never fired.
    pub fn is_fired(&self, row: usize, column: usize) -> bool {
        row < self.size() && self.fired_cells(row).any(|c| c.column == column)
    }

    /// Fired columns per row: one finite [`FiredColumns`] per row, in row
    /// order. Call again to restart.
    pub fn nz_rows(&self) -> NzRows<'_> {
        NzRows {
            origin:  self.origin,
            offsets: &self.offsets,
            fired:   &self.fired,
            row:     0,
        }
    }
}

// ─────────────────────────────────────────────
// Row iterators
// ─────────────────────────────────────────────

/// Iterator over the rows of a [`ManifestMatrix`]; see [`ManifestMatrix::nz_rows`].
#[derive(Debug, Clone)]
pub struct NzRows<'m> {
    origin:  &'m SparseMatrix,
    offsets: &'m [usize],
    fired:   &'m [bool],
    row:     usize,
}

impl<'m> Iterator for NzRows<'m> {
    type Item = FiredColumns<'m>;

    fn next(&mut self) -> Option<Self::Item> {
        let cells = self.origin.row(self.row).ok()?;
        let flags = &self.fired[self.offsets[self.row]..self.offsets[self.row + 1]];
        self.row += 1;
        Some(FiredColumns { cells: cells.iter(), flags: flags.iter() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.origin.size().saturating_sub(self.row);
        (left, Some(left))
    }
}

impl ExactSizeIterator for NzRows<'_> {}

/// Columns that fired in one row, in insertion order.
#[derive(Debug, Clone)]
pub struct FiredColumns<'m> {
    cells: std::slice::Iter<'m, Cell>,
    flags: std::slice::Iter<'m, bool>,
}

impl Iterator for FiredColumns<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let cell = self.cells.next()?;
            if *self.flags.next()? {
                return Some(cell.column);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cells.len()))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
