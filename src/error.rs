//! # Error Types
//!
//! This module defines error types used throughout the oledpack library.
//!
//! Every public entry point fails with a structured [`OledpackError`] that
//! identifies its kind and carries enough context (expected/actual values)
//! to build an actionable message. The [`ErrorKind`] discriminant is what
//! validation reports serialize, so downstream tooling can match on the
//! kind without parsing message text.

use serde::Serialize;
use thiserror::Error;

use crate::frame::Dimensions;

/// Main error type for oledpack operations
#[derive(Debug, Error)]
pub enum OledpackError {
    /// A frame's dimensions disagree with what a preset expects.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: Dimensions,
        actual: Dimensions,
    },

    /// Lookup of a device tag that is not in the registry.
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    /// Out-of-range or unparseable option values.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Packed output length disagrees with the preset's expected byte
    /// count. This is an internal invariant violation, not a user input
    /// error.
    #[error("Packed byte count for '{preset}' is {actual}, expected {expected}")]
    ByteCount {
        preset: String,
        expected: usize,
        actual: usize,
    },

    /// The decode collaborator was handed a file in a format it does not
    /// understand.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The decode collaborator recognized the format but could not decode
    /// the file.
    #[error("Corrupt image file '{name}': {reason}")]
    CorruptFile { name: String, reason: String },

    /// Frames within one sequence disagree with each other (distinct from
    /// disagreeing with a preset).
    #[error("Inconsistent dimensions in sequence: frame 0 is {first}, frame {index} is {actual}")]
    InconsistentDimensions {
        first: Dimensions,
        index: usize,
        actual: Dimensions,
    },

    /// Preview surface or image encoding failure.
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kind tag for an [`OledpackError`], used by validation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    DimensionMismatch,
    UnknownPreset,
    InvalidParameters,
    ByteCount,
    UnsupportedFormat,
    CorruptFile,
    InconsistentDimensions,
    Render,
    Io,
}

impl OledpackError {
    /// The kind tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::UnknownPreset(_) => ErrorKind::UnknownPreset,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::ByteCount { .. } => ErrorKind::ByteCount,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::CorruptFile { .. } => ErrorKind::CorruptFile,
            Self::InconsistentDimensions { .. } => ErrorKind::InconsistentDimensions,
            Self::Render(_) => ErrorKind::Render,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_cites_both_sizes() {
        let err = OledpackError::DimensionMismatch {
            expected: Dimensions::new(128, 32),
            actual: Dimensions::new(64, 32),
        };
        let msg = err.to_string();
        assert!(msg.contains("128x32"), "missing expected size: {}", msg);
        assert!(msg.contains("64x32"), "missing actual size: {}", msg);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            OledpackError::UnknownPreset("X".into()).kind(),
            ErrorKind::UnknownPreset
        );
        assert_eq!(
            OledpackError::InvalidParameters("threshold".into()).kind(),
            ErrorKind::InvalidParameters
        );
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::DimensionMismatch).unwrap();
        assert_eq!(json, "\"dimension-mismatch\"");
    }
}
