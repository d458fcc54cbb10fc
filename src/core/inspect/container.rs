//! Container identification types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image container family recognised by the sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerFamily {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
    Unknown,
}

impl ContainerFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFamily::Png => "PNG",
            ContainerFamily::Jpeg => "JPEG",
            ContainerFamily::Gif => "GIF",
            ContainerFamily::Bmp => "BMP",
            ContainerFamily::Webp => "WEBP",
            ContainerFamily::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ContainerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence attached to a sniffer verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Result of container sniffing. Created once per inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDescriptor {
    #[serde(rename = "containerType")]
    pub family: ContainerFamily,
    pub confidence: Confidence,
    /// Leading bytes the verdict was based on (first 16 at most).
    #[serde(rename = "magicBytes", with = "super::hex_bytes")]
    pub magic_prefix: Vec<u8>,
}

impl ContainerDescriptor {
    pub fn new(family: ContainerFamily, confidence: Confidence, magic_prefix: Vec<u8>) -> Self {
        Self {
            family,
            confidence,
            magic_prefix,
        }
    }

    pub fn is_known(&self) -> bool {
        self.family != ContainerFamily::Unknown
    }
}
