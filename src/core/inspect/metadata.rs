//! Declared metadata as returned by a metadata collaborator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar-or-list tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<TagValue>),
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        TagValue::Int(v)
    }
}

impl From<u32> for TagValue {
    fn from(v: u32) -> Self {
        TagValue::Int(v as i64)
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        TagValue::Bool(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    pub format: String,
    /// Pixel mode in the usual imaging-library vocabulary (`RGB`, `RGBA`, `L`, `P`, `CMYK`...).
    pub mode: String,
    pub width: u32,
    pub height: u32,
    /// Horizontal and vertical resolution in dots per inch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<[f64; 2]>,
    pub has_color_profile: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredMetadata {
    pub tags: BTreeMap<String, TagValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_properties: Option<ImageProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<BTreeMap<String, String>>,
    /// Set when the collaborator failed; other fields are then empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeclaredMetadata {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn has_exif(&self) -> bool {
        self.tags.keys().any(|k| k.starts_with("EXIF"))
    }
}
