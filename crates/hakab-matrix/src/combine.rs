//! Pluggable per-edge combine operators for the aggregator.
//!
//! ## Zero-identity law
//!
//! ```text
//! combine(0, v) == 1      combine(w, 0) == 1
//! ```
//!
//! The aggregator folds a row as a product starting at `1.0`, so an absent
//! edge or an absent signal must contribute the neutral factor. The law is
//! not enforced by the type system; [`verify_zero_law`] probes it and the
//! aggregator runs that probe as a `debug_assert!`.
//!
//! | Operator               | `combine(w, v)`          | Row aggregate means          |
//! |------------------------|--------------------------|------------------------------|
//! | [`ZeroGuardedProduct`] | `w · v` (1 on any zero)  | product of weighted signals  |
//! | [`NonTransmission`]    | `1 − w · v`              | P(no edge transmits)         |

use crate::error::MatrixError;

/// Binary operator applied to `(strength, signal)` pairs.
///
/// `w` is the manifested strength of the edge, `v` the external signal value
/// at the edge's column. Implementations must honour the zero-identity law.
pub trait Combine {
    fn combine(&self, w: f32, v: f32) -> f32;
}

impl<F> Combine for F
where
    F: Fn(f32, f32) -> f32,
{
    #[inline]
    fn combine(&self, w: f32, v: f32) -> f32 {
        self(w, v)
    }
}

/// `w · v`, or `1` when either operand is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroGuardedProduct;

impl Combine for ZeroGuardedProduct {
    #[inline]
    fn combine(&self, w: f32, v: f32) -> f32 {
        if w == 0.0 || v == 0.0 {
            1.0
        } else {
            w * v
        }
    }
}

/// Probability that an edge of strength `w` does *not* transmit a signal of
/// contagiousness `v`: `1 − w · v`.
///
/// The row aggregate is then the probability of escaping every fired edge;
/// see [`probability_of_any`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NonTransmission;

impl Combine for NonTransmission {
    #[inline]
    fn combine(&self, w: f32, v: f32) -> f32 {
        1.0 - w * v
    }
}

/// Convert a [`NonTransmission`] aggregate into the probability that at least
/// one edge transmitted.
#[inline]
pub fn probability_of_any(aggregate: f32) -> f32 {
    1.0 - aggregate
}

const PROBE_VALUES: [f32; 8] = [1.0, 0.5, 2.0, -1.0, 10.0, 0.25, 1e-3, 100.0];
const LAW_TOLERANCE: f32 = 1e-6;

/// Probe `op` with `probes` zero/nonzero pairs in both operand positions.
///
/// Returns the first violating pair. A passing probe is evidence, not proof:
/// the law is undecidable for arbitrary closures.
pub fn verify_zero_law<C: Combine + ?Sized>(op: &C, probes: usize) -> Result<(), MatrixError> {
    for x in PROBE_VALUES.iter().cycle().take(probes.max(1)) {
        for (w, v) in [(0.0, *x), (*x, 0.0)] {
            let got = op.combine(w, v);
            if !((got - 1.0).abs() <= LAW_TOLERANCE) {
                return Err(MatrixError::CombineLawViolated { w, v, got });
            }
        }
    }
    Ok(())
}
