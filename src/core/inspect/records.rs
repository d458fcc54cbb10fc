//! Structural records produced by the container walkers.

use super::container::ContainerFamily;
use super::issues::InspectIssue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a structural record.
///
/// Serialized as a plain string: printable FourCCs as-is (`IHDR`, `VP8X`),
/// JPEG markers as `0xFFE1`, non-printable FourCCs as `0x` + 8 hex digits,
/// anything else (GIF/BMP block names, never four characters long) verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordTag {
    FourCC([u8; 4]),
    Marker(u8),
    Block(String),
}

impl RecordTag {
    pub fn fourcc(&self) -> Option<&[u8; 4]> {
        match self {
            RecordTag::FourCC(cc) => Some(cc),
            _ => None,
        }
    }

    pub fn marker(&self) -> Option<u8> {
        match self {
            RecordTag::Marker(m) => Some(*m),
            _ => None,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        match self {
            RecordTag::FourCC(cc) => cc.as_slice() == name.as_bytes(),
            RecordTag::Block(b) => b == name,
            RecordTag::Marker(_) => false,
        }
    }

    fn printable(cc: &[u8; 4]) -> bool {
        cc.iter().all(|&b| b.is_ascii_graphic() || b == b' ')
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTag::FourCC(cc) if Self::printable(cc) => {
                // printable() guarantees ASCII
                write!(f, "{}", String::from_utf8_lossy(cc))
            }
            RecordTag::FourCC(cc) => write!(f, "0x{}", hex::encode_upper(cc)),
            RecordTag::Marker(m) => write!(f, "0xFF{:02X}", m),
            RecordTag::Block(name) => f.write_str(name),
        }
    }
}

impl From<RecordTag> for String {
    fn from(tag: RecordTag) -> Self {
        tag.to_string()
    }
}

impl From<String> for RecordTag {
    fn from(s: String) -> Self {
        if let Some(hexpart) = s.strip_prefix("0x") {
            if let Ok(bytes) = hex::decode(hexpart) {
                match bytes.as_slice() {
                    [0xFF, m] => return RecordTag::Marker(*m),
                    [a, b, c, d] => return RecordTag::FourCC([*a, *b, *c, *d]),
                    _ => {}
                }
            }
        }
        let bytes = s.as_bytes();
        if bytes.len() == 4 {
            let cc = [bytes[0], bytes[1], bytes[2], bytes[3]];
            if Self::printable(&cc) {
                return RecordTag::FourCC(cc);
            }
        }
        RecordTag::Block(s)
    }
}

/// One chunk, segment or block in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub type_tag: RecordTag,
    /// Offset of the record's first byte (length field, marker or introducer).
    pub byte_offset: u64,
    /// Offset of the record's payload.
    pub data_offset: u64,
    /// Payload length in bytes, after clipping.
    pub length: u32,
    pub is_pixel_data: bool,
    /// PNG only: result of the CRC-32 check when verification is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc_valid: Option<bool>,
    /// Declared length ran past EOF and was clipped to the bytes present.
    #[serde(default, skip_serializing_if = "super::is_false")]
    pub clipped: bool,
}

impl ChunkRecord {
    pub fn new(
        type_tag: RecordTag,
        byte_offset: u64,
        data_offset: u64,
        length: u32,
        is_pixel_data: bool,
    ) -> Self {
        Self {
            type_tag,
            byte_offset,
            data_offset,
            length,
            is_pixel_data,
            crc_valid: None,
            clipped: false,
        }
    }
}

/// Output of the structural walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralReport {
    pub format: ContainerFamily,
    pub records: Vec<ChunkRecord>,
    pub pixel_bytes: u64,
    pub non_pixel_bytes: u64,
    pub total_bytes: u64,
    pub truncated: bool,
    pub end_marker_found: bool,
    /// Bytes following the end marker.
    pub trailing_bytes: u64,
    /// Findings raised during the walk; rendered into report warnings.
    #[serde(skip)]
    pub issues: Vec<InspectIssue>,
}

impl StructuralReport {
    /// Minimal descriptor for families without a walker.
    pub fn minimal(format: ContainerFamily, total_bytes: u64) -> Self {
        Self {
            format,
            records: Vec::new(),
            pixel_bytes: 0,
            non_pixel_bytes: 0,
            total_bytes,
            truncated: false,
            end_marker_found: false,
            trailing_bytes: 0,
            issues: Vec::new(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn has_crc_mismatch(&self) -> bool {
        self.records.iter().any(|r| r.crc_valid == Some(false))
    }

    pub fn find(&self, name: &str) -> impl Iterator<Item = &ChunkRecord> {
        let name = name.to_string();
        self.records.iter().filter(move |r| r.type_tag.is(&name))
    }
}
