//! bareblocks: layered inspection of image containers.
//!
//! An inspection walks a PNG, JPEG, GIF, BMP or WebP file's container
//! structure without decoding pixels, accounts every byte as pixel or
//! non-pixel data, decodes textual payloads, recognises AI-generation tool
//! fingerprints and scores size anomalies. The result is a deterministic,
//! JSON-serialisable [`InspectionReport`].
//!
//! ```no_run
//! use bareblocks::Inspector;
//!
//! let report = Inspector::default().inspect_path("image.png")?;
//! println!("{}", report.to_json_string_pretty()?);
//! # Ok::<(), bareblocks::InspectError>(())
//! ```

/// Core data types module
pub mod core;
pub mod entropy;
pub mod error;
pub mod inspect;
pub mod logging;

pub use crate::core::inspect::{
    AIPatternResult, AnomalyFlag, AnomalyReport, ChunkRecord, Classification, ContainerDescriptor,
    ContainerFamily, DeclaredMetadata, InspectIssue, InspectionReport, PayloadContent,
    PayloadRecord, RecordTag, Stage, StructuralReport,
};
pub use error::{InspectError, Result};
pub use inspect::{InspectConfig, Inspector, MetadataExtractor};
