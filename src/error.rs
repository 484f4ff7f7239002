//! Error types for case generation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for case generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a case build.
///
/// None of these are recoverable: they signal a mistake in the authored
/// parameters or keyboard definition, and the run stops without output.
#[derive(Debug, Error)]
pub enum Error {
    /// A derived quantity needs an invalid real operation.
    #[error("parameter domain error: {0}")]
    ParameterDomain(String),

    /// A parameter breaks one of the documented invariants.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name as written in the definition file.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A primitive was requested with impossible dimensions.
    #[error("invalid {primitive} geometry: {reason}")]
    InvalidPrimitiveGeometry {
        /// Primitive kind.
        primitive: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The screw mask enables positions that do not exist.
    #[error("screw mask {0:#b} sets bits beyond the four hardware positions")]
    UnsupportedScrewBits(u64),

    /// A definition file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A definition file is not valid JSON5 for the expected schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: json5::Error,
    },
}

impl Error {
    pub(crate) fn primitive(primitive: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidPrimitiveGeometry {
            primitive,
            reason: reason.into(),
        }
    }

    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
