//! `hakab-matrix` — sparse contact matrix for stochastic spread simulation.
//!
//! Stores, per cell, a **probability** and a **strength** channel, each
//! adjusted by per-row and per-column affine transforms. Once per tick the
//! matrix is *manifested* against externally supplied draws, and the fired
//! edges aggregate an external signal per row through a pluggable operator.
//!
//! ## Crate structure
//!
//! | Module         | Responsibility                                           |
//! |----------------|----------------------------------------------------------|
//! | [`store`]      | [`SparseMatrix`] — per-row cells + affine transforms     |
//! | [`manifest`]   | [`ManifestMatrix`] — fired mask borrowed over the store  |
//! | [`aggregate`]  | `I_POA` — per-row fold of signal × fired strength        |
//! | [`combine`]    | [`Combine`] operators and the zero-identity law          |
//! | [`draws`]      | [`DrawSource`] — seeded / thread uniform draws           |
//! | [`config`]     | [`MatrixConfig`] — env / serde configuration             |
//!
//! ## Quick start
//!
//! ```rust
//! use hakab_matrix::{SparseMatrix, ZeroGuardedProduct};
//!
//! let mut m = SparseMatrix::new(3);
//! m.batch_set(0, &[1, 2], &[0.5, 0.9], &[2.0, 3.0])?;
//!
//! let fired = m.manifest(&[0.4, 0.95])?;
//! assert_eq!(fired.get(0, 1)?, 2.0);
//! assert_eq!(fired.get(0, 2)?, 0.0);
//!
//! let out = fired.i_poa(&[10.0], &[1], &ZeroGuardedProduct)?;
//! assert_eq!(out, vec![20.0, 1.0, 1.0]);
//! # Ok::<(), hakab_matrix::MatrixError>(())
//! ```

pub mod aggregate;
pub mod combine;
pub mod config;
pub mod draws;
pub mod error;
pub mod manifest;
pub mod store;

pub use combine::{probability_of_any, verify_zero_law, Combine, NonTransmission, ZeroGuardedProduct};
pub use config::MatrixConfig;
pub use draws::DrawSource;
pub use error::MatrixError;
pub use manifest::{FiredColumns, ManifestMatrix, NzRows};
pub use store::{Cell, SparseMatrix};

pub type Result<T> = std::result::Result<T, MatrixError>;
