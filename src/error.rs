//! Error types for the bareblocks inspector.
//!
//! Fatal failures abort an inspection and surface as a single [`InspectError`].
//! Recoverable findings (truncation, CRC mismatches, undecodable payloads) are
//! not errors; they travel as [`crate::core::inspect::InspectIssue`] values and
//! end up as report warnings or uncertainties.

use crate::core::inspect::Stage;
use thiserror::Error;

/// Main error type for inspection operations.
#[derive(Debug, Error)]
pub enum InspectError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zero-length input stream
    #[error("Empty input: nothing to inspect")]
    EmptyInput,

    /// Input exceeds the configured size ceiling
    #[error("Input too large: {size} bytes (limit: {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// No known image signature and no structural fallback possible
    #[error("Unsupported container: no known image signature (magic {magic})")]
    UnsupportedContainer { magic: String },

    /// Requested byte range lies outside the file
    #[error("Invalid range: offset {offset:#x} + {length} exceeds file size {size}")]
    InvalidRange { offset: u64, length: u64, size: u64 },

    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Declared-metadata collaborator failure (never escapes the orchestrator)
    #[error("Metadata extraction failed: {0}")]
    Metadata(String),

    /// A pipeline stage aborted the inspection
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<InspectError>,
    },
}

impl InspectError {
    /// Wrap an error with the pipeline stage that produced it.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ InspectError::Stage { .. } => already,
            other => InspectError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping stage wrappers.
    pub fn root(&self) -> &InspectError {
        match self {
            InspectError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for inspection operations
pub type Result<T> = std::result::Result<T, InspectError>;
