//! Tuning knobs for matrix construction and the aggregator's debug checks.

use serde::{Deserialize, Serialize};

/// Default number of zero/nonzero probe pairs for [`verify_zero_law`](crate::combine::verify_zero_law).
pub const LAW_PROBES_DEFAULT: usize = 8;

/// Configuration shared by [`SparseMatrix`](crate::SparseMatrix) and
/// [`DrawSource`](crate::DrawSource).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Capacity reserved the first time a row receives cells.
    /// `0` lets the row grow on demand.
    pub row_capacity: usize,
    /// Probe pairs checked against the combine law in debug builds.
    pub law_probes:   usize,
    /// Seed for reproducible draw streams. `None` uses the thread RNG.
    pub draw_seed:    Option<u64>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            row_capacity: 0,
            law_probes:   LAW_PROBES_DEFAULT,
            draw_seed:    None,
        }
    }
}

impl MatrixConfig {
    /// Read overrides from `HAKAB_MATRIX_*` environment variables.
    ///
    /// Unset or unparseable variables fall back to [`Default`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            row_capacity: env_parse("HAKAB_MATRIX_ROW_CAPACITY").unwrap_or(defaults.row_capacity),
            law_probes:   env_parse("HAKAB_MATRIX_LAW_PROBES").unwrap_or(defaults.law_probes),
            draw_seed:    env_parse("HAKAB_MATRIX_DRAW_SEED").or(defaults.draw_seed),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config override");
            None
        }
    }
}
