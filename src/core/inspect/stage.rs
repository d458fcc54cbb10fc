//! Pipeline stage identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight ordered stages of an inspection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Intake,
    ContainerId,
    StructuralWalk,
    DeclaredMetadata,
    PayloadExtraction,
    PatternRecognition,
    AnomalyScoring,
    ReportAssembly,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 8] = [
        Stage::Intake,
        Stage::ContainerId,
        Stage::StructuralWalk,
        Stage::DeclaredMetadata,
        Stage::PayloadExtraction,
        Stage::PatternRecognition,
        Stage::AnomalyScoring,
        Stage::ReportAssembly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intake => "intake",
            Stage::ContainerId => "container-id",
            Stage::StructuralWalk => "structural-walk",
            Stage::DeclaredMetadata => "declared-metadata",
            Stage::PayloadExtraction => "payload-extraction",
            Stage::PatternRecognition => "pattern-recognition",
            Stage::AnomalyScoring => "anomaly-scoring",
            Stage::ReportAssembly => "report-assembly",
        }
    }

    /// 1-based position in the pipeline.
    pub fn ordinal(&self) -> usize {
        Stage::ALL
            .iter()
            .position(|s| s == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
