use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("index out of range: {index} >= size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("combine law violated: combine({w}, {v}) = {got}, expected 1")]
    CombineLawViolated { w: f32, v: f32, got: f32 },
}

impl MatrixError {
    #[inline]
    pub(crate) fn check_index(index: usize, size: usize) -> Result<(), Self> {
        if index < size {
            Ok(())
        } else {
            Err(Self::IndexOutOfRange { index, size })
        }
    }

    #[inline]
    pub(crate) fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), Self> {
        if expected == got {
            Ok(())
        } else {
            Err(Self::LengthMismatch { what, expected, got })
        }
    }
}
