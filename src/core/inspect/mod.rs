//! Core inspection data types organized by submodule.

pub mod anomaly;
pub mod container;
pub mod intake;
pub mod issues;
pub mod metadata;
pub mod patterns;
pub mod payload;
pub mod records;
pub mod report;
pub mod stage;

// Re-exports for convenient access under crate::core::inspect::*
pub use anomaly::{AnomalyFlag, AnomalyReport};
pub use container::{Confidence, ContainerDescriptor, ContainerFamily};
pub use intake::IntakeSummary;
pub use issues::{InspectIssue, IssueKind, Severity};
pub use metadata::{DeclaredMetadata, ImageProperties, TagValue};
pub use patterns::AIPatternResult;
pub use payload::{Classification, DecodeStep, PayloadContent, PayloadRecord};
pub use records::{ChunkRecord, RecordTag, StructuralReport};
pub use report::{InspectionReport, ReportSummary};
pub use stage::Stage;

/// Serde helper storing byte buffers as lowercase hex strings.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn is_false(v: &bool) -> bool {
    !*v
}
