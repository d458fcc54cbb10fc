//! Configuration for the inspection pipeline.
//!
//! Provides centralized configuration for all inspection components with
//! sensible defaults. Every section is `#[serde(default)]`, so a JSON file only
//! needs the values it overrides.

use crate::error::{InspectError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for the inspection pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// I/O configuration for file reading.
    pub io: IOConfig,
    /// Structural walker configuration.
    pub structure: StructureConfig,
    /// Payload extraction configuration.
    pub payloads: PayloadConfig,
    /// Anomaly scoring thresholds.
    pub anomaly: AnomalyConfig,
}

impl InspectConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| InspectError::Config(format!("invalid JSON: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.io.max_sniff_size < 16 {
            return Err(InspectError::Config(format!(
                "io.max_sniff_size must be at least 16 (got {})",
                self.io.max_sniff_size
            )));
        }
        if self.io.max_file_size == 0 {
            return Err(InspectError::Config("io.max_file_size must be non-zero".into()));
        }
        if self.structure.max_records == 0 {
            return Err(InspectError::Config(
                "structure.max_records must be non-zero".into(),
            ));
        }
        let ratio = self.anomaly.non_pixel_ratio_threshold;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(InspectError::Config(format!(
                "anomaly.non_pixel_ratio_threshold must be within [0, 1] (got {})",
                ratio
            )));
        }
        let h = self.anomaly.high_entropy_threshold;
        if !(0.0..=8.0).contains(&h) {
            return Err(InspectError::Config(format!(
                "anomaly.high_entropy_threshold must be within [0, 8] (got {})",
                h
            )));
        }
        Ok(())
    }
}

/// I/O configuration for file reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Leading bytes read for container sniffing (default: 32).
    pub max_sniff_size: usize,
    /// Maximum file size to inspect (default: 104857600 = 100MB).
    pub max_file_size: u64,
    /// Buffer size for streamed hashing and CRC checks (default: 65536).
    pub read_buffer_size: usize,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_sniff_size: 32,
            max_file_size: 104857600, // 100MB
            read_buffer_size: 65536,
        }
    }
}

/// Structural walker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Recompute PNG chunk CRCs and flag mismatches (default: true).
    pub verify_crc: bool,
    /// Stop walking after this many records (default: 100000).
    pub max_records: usize,
    /// Produce a minimal report instead of failing on unrecognised input (default: false).
    pub allow_unknown_containers: bool,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            verify_crc: true,
            max_records: 100_000,
            allow_unknown_containers: false,
        }
    }
}

/// Payload extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Maximum raw bytes read from one record (default: 16777216 = 16MB).
    pub max_payload_bytes: u64,
    /// Maximum bytes produced when inflating one record (default: 16777216 = 16MB).
    pub max_inflated_bytes: u64,
    /// Treat JPEG COM segments as textual payloads (default: true).
    pub jpeg_comments: bool,
    /// Treat GIF comment extensions as textual payloads (default: true).
    pub gif_comments: bool,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 16 * 1024 * 1024,
            max_inflated_bytes: 16 * 1024 * 1024,
            jpeg_comments: true,
            gif_comments: true,
        }
    }
}

/// Anomaly scoring thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Non-pixel ratio above which `large_non_pixel_data` is raised (default: 0.3).
    pub non_pixel_ratio_threshold: f64,
    /// Binary payload entropy above which `high_entropy_payload` is raised (default: 7.5).
    pub high_entropy_threshold: f64,
    /// Trailing bytes after the end marker above which `trailing_data` is raised (default: 0).
    pub trailing_data_min_bytes: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            non_pixel_ratio_threshold: 0.3,
            high_entropy_threshold: 7.5,
            trailing_data_min_bytes: 0,
        }
    }
}
