//! The assembled inspection report.

use super::anomaly::AnomalyReport;
use super::container::ContainerDescriptor;
use super::intake::IntakeSummary;
use super::issues::{InspectIssue, Severity};
use super::metadata::DeclaredMetadata;
use super::patterns::AIPatternResult;
use super::payload::PayloadRecord;
use super::records::StructuralReport;
use crate::error::InspectError;
use serde::{Deserialize, Serialize};

/// Headline facts about the inspected file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub file_name: String,
    pub file_size: u64,
    pub sha256: String,
    pub mime_hint: String,
    #[serde(flatten)]
    pub container: ContainerDescriptor,
    pub has_exif: bool,
    pub has_payloads: bool,
    pub has_ai_metadata: bool,
    pub record_count: usize,
}

/// Inspection output. Built once by the orchestrator and read-only afterwards.
///
/// JSON field order is fixed: `summary`, `structure`, `metadata`, `payloads`,
/// `aiMetadata`, `anomalies`, `warnings`, `uncertainties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    summary: ReportSummary,
    structure: StructuralReport,
    metadata: DeclaredMetadata,
    payloads: Vec<PayloadRecord>,
    ai_metadata: AIPatternResult,
    anomalies: AnomalyReport,
    warnings: Vec<String>,
    uncertainties: Vec<String>,
}

impl InspectionReport {
    /// Structural merge of stage outputs. Issues are split by severity,
    /// keeping pipeline order: intake, structure, then `extra` in the order given.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        intake: IntakeSummary,
        container: ContainerDescriptor,
        structure: StructuralReport,
        metadata: DeclaredMetadata,
        payloads: Vec<PayloadRecord>,
        ai_metadata: AIPatternResult,
        anomalies: AnomalyReport,
        extra: Vec<InspectIssue>,
    ) -> Self {
        let mut warnings = Vec::new();
        let mut uncertainties = Vec::new();
        for issue in intake
            .issues
            .iter()
            .chain(structure.issues.iter())
            .chain(extra.iter())
        {
            match issue.severity() {
                Severity::Warning => warnings.push(issue.to_string()),
                Severity::Uncertainty => uncertainties.push(issue.to_string()),
            }
        }

        let summary = ReportSummary {
            file_name: intake.file_name,
            file_size: intake.file_size,
            sha256: intake.sha256,
            mime_hint: intake.mime_hint,
            container,
            has_exif: metadata.has_exif(),
            has_payloads: !payloads.is_empty(),
            has_ai_metadata: ai_metadata.tool.is_some(),
            record_count: structure.record_count(),
        };

        Self {
            summary,
            structure,
            metadata,
            payloads,
            ai_metadata,
            anomalies,
            warnings,
            uncertainties,
        }
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn structure(&self) -> &StructuralReport {
        &self.structure
    }

    pub fn metadata(&self) -> &DeclaredMetadata {
        &self.metadata
    }

    pub fn payloads(&self) -> &[PayloadRecord] {
        &self.payloads
    }

    pub fn ai_metadata(&self) -> &AIPatternResult {
        &self.ai_metadata
    }

    pub fn anomalies(&self) -> &AnomalyReport {
        &self.anomalies
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn uncertainties(&self) -> &[String] {
        &self.uncertainties
    }

    pub fn to_json_string(&self) -> Result<String, InspectError> {
        serde_json::to_string(self)
            .map_err(|e| InspectError::Serialization(format!("JSON serialization error: {}", e)))
    }

    pub fn to_json_string_pretty(&self) -> Result<String, InspectError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InspectError::Serialization(format!("JSON serialization error: {}", e)))
    }

    pub fn from_json_str(json_str: &str) -> Result<Self, InspectError> {
        serde_json::from_str(json_str)
            .map_err(|e| InspectError::Serialization(format!("JSON deserialization error: {}", e)))
    }
}
