//! Anomaly scoring over structural and payload findings.

use crate::core::inspect::{AnomalyFlag, AnomalyReport, PayloadRecord, StructuralReport};
use crate::inspect::config::AnomalyConfig;
use std::collections::BTreeSet;
use tracing::debug;

/// Scoring engine holding the configured thresholds.
pub struct ScoreEngine {
    config: AnomalyConfig,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

impl ScoreEngine {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Share of non-pixel bytes, 0 for an empty file, clamped to `[0, 1]`.
    pub fn non_pixel_ratio(&self, structure: &StructuralReport) -> f64 {
        if structure.total_bytes == 0 {
            return 0.0;
        }
        (structure.non_pixel_bytes as f64 / structure.total_bytes as f64).clamp(0.0, 1.0)
    }

    pub fn score(&self, structure: &StructuralReport, payloads: &[PayloadRecord]) -> AnomalyReport {
        let ratio = self.non_pixel_ratio(structure);
        let mut flags = BTreeSet::new();

        if ratio > self.config.non_pixel_ratio_threshold {
            flags.insert(AnomalyFlag::LargeNonPixelData);
        }
        if !payloads.is_empty() {
            flags.insert(AnomalyFlag::CustomChunksPresent);
        }
        if structure.truncated {
            flags.insert(AnomalyFlag::TruncatedStructure);
        }
        if structure.has_crc_mismatch() {
            flags.insert(AnomalyFlag::CrcMismatch);
        }
        if structure.trailing_bytes > self.config.trailing_data_min_bytes {
            flags.insert(AnomalyFlag::TrailingData);
        }
        if payloads
            .iter()
            .filter_map(|p| p.content.entropy())
            .any(|h| h > self.config.high_entropy_threshold)
        {
            flags.insert(AnomalyFlag::HighEntropyPayload);
        }

        debug!(ratio, flags = flags.len(), "anomaly scoring complete");
        AnomalyReport {
            non_pixel_ratio: ratio,
            flags,
            pixel_bytes: structure.pixel_bytes,
            non_pixel_bytes: structure.non_pixel_bytes,
            file_size: structure.total_bytes,
        }
    }
}

/// Score with explicit thresholds.
pub fn score(
    structure: &StructuralReport,
    payloads: &[PayloadRecord],
    config: &AnomalyConfig,
) -> AnomalyReport {
    ScoreEngine::new(config.clone()).score(structure, payloads)
}
