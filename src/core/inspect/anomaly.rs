//! Size and anomaly heuristics output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Threshold-triggered anomaly flags. Not mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyFlag {
    LargeNonPixelData,
    CustomChunksPresent,
    TruncatedStructure,
    CrcMismatch,
    TrailingData,
    HighEntropyPayload,
}

impl AnomalyFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyFlag::LargeNonPixelData => "large_non_pixel_data",
            AnomalyFlag::CustomChunksPresent => "custom_chunks_present",
            AnomalyFlag::TruncatedStructure => "truncated_structure",
            AnomalyFlag::CrcMismatch => "crc_mismatch",
            AnomalyFlag::TrailingData => "trailing_data",
            AnomalyFlag::HighEntropyPayload => "high_entropy_payload",
        }
    }
}

impl fmt::Display for AnomalyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// Share of the file outside image-data regions, in `[0, 1]`.
    pub non_pixel_ratio: f64,
    pub flags: BTreeSet<AnomalyFlag>,
    pub pixel_bytes: u64,
    pub non_pixel_bytes: u64,
    pub file_size: u64,
}

impl AnomalyReport {
    pub fn has(&self, flag: AnomalyFlag) -> bool {
        self.flags.contains(&flag)
    }
}
