//! Non-fatal findings raised while inspecting a file.
//!
//! Issues never abort a run. The report assembler renders each one into the
//! `warnings` or `uncertainties` list according to its [`Severity`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standardized issue kinds encountered during inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Stream ended before the format's end marker.
    Truncated,
    /// A declared length ran past EOF and was clipped.
    ClippedLength,
    /// Stored CRC does not match the recomputed one.
    CrcMismatch,
    /// Walk finished without seeing the end marker.
    MissingEndMarker,
    /// Bytes present after the end marker.
    TrailingData,
    /// Unexpected byte where a marker or block introducer was expected.
    BadMarker,
    /// Fewer bytes were available than a fixed-size header needs.
    ShortRead,
    /// Payload bytes could not be decoded and were kept as binary.
    UndecodablePayload,
    /// Compressed payload failed to inflate.
    InflateFailed,
    /// Text decoding fell back to Latin-1.
    LossyDecode,
    /// Payload or inflated text cut at the configured ceiling.
    PayloadCapped,
    /// Content and extension disagree on the file type.
    MimeMismatch,
    /// Structure enumeration is partial or not available for the family.
    Unsupported,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        use IssueKind::*;
        match self {
            Truncated | ClippedLength | CrcMismatch | MissingEndMarker | TrailingData
            | BadMarker | ShortRead => Severity::Warning,
            UndecodablePayload | InflateFailed | LossyDecode | PayloadCapped | MimeMismatch
            | Unsupported => Severity::Uncertainty,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use IssueKind::*;
        match self {
            Truncated => "truncated",
            ClippedLength => "clipped_length",
            CrcMismatch => "crc_mismatch",
            MissingEndMarker => "missing_end_marker",
            TrailingData => "trailing_data",
            BadMarker => "bad_marker",
            ShortRead => "short_read",
            UndecodablePayload => "undecodable_payload",
            InflateFailed => "inflate_failed",
            LossyDecode => "lossy_decode",
            PayloadCapped => "payload_capped",
            MimeMismatch => "mime_mismatch",
            Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an issue lands in the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Uncertainty,
}

/// Concrete issue with optional file offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectIssue {
    pub kind: IssueKind,
    pub offset: Option<u64>,
    pub message: String,
}

impl InspectIssue {
    pub fn new(kind: IssueKind, offset: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    pub fn at(kind: IssueKind, offset: u64, message: impl Into<String>) -> Self {
        Self::new(kind, Some(offset), message)
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for InspectIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(off) => write!(f, "{} at offset {:#x}: {}", self.kind, off, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}
