//! Opaque payload records extracted from textual chunks and segments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Coarse classification of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Json,
    Text,
    Binary,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Json => write!(f, "json"),
            Classification::Text => write!(f, "text"),
            Classification::Binary => write!(f, "binary"),
        }
    }
}

/// Decoded payload content, keyed by classification.
///
/// Serialized inline into [`PayloadRecord`] as
/// `"classification": "json", "content": {...}` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "classification", rename_all = "lowercase")]
pub enum PayloadContent {
    Json { content: Value },
    Text { content: String },
    Binary { entropy: f64 },
}

impl PayloadContent {
    pub fn classification(&self) -> Classification {
        match self {
            PayloadContent::Json { .. } => Classification::Json,
            PayloadContent::Text { .. } => Classification::Text,
            PayloadContent::Binary { .. } => Classification::Binary,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            PayloadContent::Json { content } => Some(content),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PayloadContent::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn entropy(&self) -> Option<f64> {
        match self {
            PayloadContent::Binary { entropy } => Some(*entropy),
            _ => None,
        }
    }
}

/// One step of the decode chain that produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStep {
    KeywordSplit,
    Inflate,
    Utf8,
    Latin1,
    Json,
    BinaryFallback,
}

/// A payload extracted from one non-pixel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRecord {
    /// Record type plus keyword when present, e.g. `tEXt:parameters`.
    pub source_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub byte_offset: u64,
    /// Raw payload size as stored in the file.
    pub byte_size: u32,
    #[serde(flatten)]
    pub content: PayloadContent,
    pub is_workflow_candidate: bool,
    /// Decode steps applied, in order.
    pub provenance: Vec<DecodeStep>,
}

impl PayloadRecord {
    pub fn classification(&self) -> Classification {
        self.content.classification()
    }
}
