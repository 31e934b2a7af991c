//! Typed error definitions for structural contract violations.
//!
//! Arithmetic edge conditions are NOT errors - they accumulate in
//! [`FaultFlags`](crate::types::FaultFlags) and never alter control flow.
//! `CoreError` covers only misuse of the public contract: bad sample
//! geometry, undersized caller buffers, codec failures.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Structural contract errors - never raised for arithmetic edge cases
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid sample geometry: ndims={ndims}, data elements={elements}")]
    InvalidGeometry { ndims: usize, elements: usize },

    #[error("sample too large: {elements} elements > {max} max")]
    SampleTooLarge { elements: u64, max: u32 },

    #[error("dimension product mismatch: dims imply {expected}, data has {actual}")]
    ElementCountMismatch { expected: u64, actual: usize },

    #[error("output buffer too small: need {needed} elements, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("normalization stats length mismatch: means={means}, inv_stds={inv_stds}")]
    StatsLengthMismatch { means: usize, inv_stds: usize },

    #[error("codec error: {0}")]
    CodecError(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Stable error code for monitoring and audit logs
    pub fn error_code(&self) -> &'static str {
        match self {
            // Sample geometry: 1xxx
            Self::InvalidGeometry { .. } => "E1000",
            Self::SampleTooLarge { .. } => "E1001",
            Self::ElementCountMismatch { .. } => "E1002",

            // Caller buffers: 2xxx
            Self::BufferTooSmall { .. } => "E2000",
            Self::StatsLengthMismatch { .. } => "E2001",

            // Codec / config: 3xxx
            Self::CodecError(_) => "E3000",
            Self::InvalidConfig(_) => "E3001",

            // General: 0xxx
            Self::InvalidInput(_) => "E0001",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let errors = vec![
            CoreError::InvalidGeometry { ndims: 5, elements: 0 }.error_code(),
            CoreError::SampleTooLarge { elements: 1, max: 0 }.error_code(),
            CoreError::ElementCountMismatch { expected: 4, actual: 3 }.error_code(),
            CoreError::BufferTooSmall { needed: 4, available: 2 }.error_code(),
            CoreError::StatsLengthMismatch { means: 2, inv_stds: 3 }.error_code(),
            CoreError::CodecError("x".into()).error_code(),
            CoreError::InvalidConfig("x".into()).error_code(),
            CoreError::InvalidInput("x".into()).error_code(),
        ];

        let mut seen = std::collections::HashSet::new();
        for code in errors {
            assert!(seen.insert(code), "duplicate error code: {}", code);
        }
    }

    #[test]
    fn test_error_display_mentions_values() {
        let err = CoreError::BufferTooSmall { needed: 16, available: 4 };
        let msg = err.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains('4'));
    }
}
