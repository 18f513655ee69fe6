//! Error types for the denoising filters.
//!
//! Every fallible filter returns [`FilterResult`]. Validation happens before
//! any output is written, so an `Err` always means the destination buffer was
//! left untouched.

use thiserror::Error;

/// Errors surfaced by the filter entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A parameter is outside its domain (window ordering, parity, strength).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The image has a channel layout the filter cannot process.
    #[error("Unsupported channel count: {channels}")]
    UnsupportedChannels { channels: usize },

    /// A caller-supplied output buffer does not match the input shape.
    #[error("Output shape {actual:?} does not match input shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    /// A flat buffer length does not match the declared dimensions.
    #[error("Buffer holds {actual} samples, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },
}

/// Result alias used throughout the crate.
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(feature = "python")]
impl From<FilterError> for pyo3::PyErr {
    fn from(err: FilterError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = FilterError::InvalidParameter("h must be positive".into());
        assert_eq!(err.to_string(), "Invalid parameter: h must be positive");
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = FilterError::ShapeMismatch {
            expected: (4, 4, 3),
            actual: (4, 4, 1),
        };
        assert_eq!(
            err.to_string(),
            "Output shape (4, 4, 1) does not match input shape (4, 4, 3)"
        );
    }
}
