//! File intake result.

use super::issues::InspectIssue;
use serde::{Deserialize, Serialize};

/// Facts gathered before any format-specific parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSummary {
    pub file_name: String,
    pub file_size: u64,
    /// Lowercase hex SHA-256 of the full content.
    pub sha256: String,
    pub mime_hint: String,
    /// Leading bytes kept for container identification.
    #[serde(skip)]
    pub leading_bytes: Vec<u8>,
    #[serde(skip)]
    pub issues: Vec<InspectIssue>,
}
