//! Pipeline orchestrator.
//!
//! Runs the eight inspection stages in order over one byte source and
//! assembles the report. Every stage runs once and only sees the typed output
//! of the stages before it. A fatal failure aborts the run with a single
//! [`InspectError`] naming the stage; no partial report is returned.

use crate::core::inspect::{
    ContainerDescriptor, DeclaredMetadata, InspectionReport, IntakeSummary, Stage,
};
use crate::error::{InspectError, Result};
use crate::inspect::config::InspectConfig;
use crate::inspect::io::{read_at, sha256_hex, ByteSource, SafeFileReader};
use crate::inspect::metadata::{HeaderMetadataReader, MetadataExtractor};
use crate::inspect::sniffers::{identify, CombinedSniffer};
use crate::inspect::{patterns, payloads, score, structure};
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};

/// Image inspector. Holds immutable configuration only, so one instance can
/// serve any number of inspections, from any number of threads.
pub struct Inspector {
    config: InspectConfig,
    extractor: Box<dyn MetadataExtractor + Send + Sync>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self {
            config: InspectConfig::default(),
            extractor: Box::new(HeaderMetadataReader),
        }
    }
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Inspector {
    /// Create an inspector after validating `config`.
    pub fn new(config: InspectConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: Box::new(HeaderMetadataReader),
        })
    }

    /// Replace the declared-metadata collaborator.
    pub fn with_extractor<E>(mut self, extractor: E) -> Self
    where
        E: MetadataExtractor + Send + Sync + 'static,
    {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Inspect a file on disk. The handle is closed when this returns.
    pub fn inspect_path<P: AsRef<Path>>(&self, path: P) -> Result<InspectionReport> {
        let path = path.as_ref();
        let mut reader = SafeFileReader::open(path, self.config.io.max_file_size)
            .map_err(|e| e.in_stage(Stage::Intake))?;
        let size = reader.size();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.run(reader.file_mut(), size, &name)
    }

    /// Inspect a seekable stream of `len` bytes.
    pub fn inspect_reader<R: Read + Seek>(
        &self,
        reader: &mut R,
        len: u64,
        name: &str,
    ) -> Result<InspectionReport> {
        self.run(reader, len, name)
    }

    /// Inspect an in-memory buffer.
    pub fn inspect_bytes(&self, bytes: &[u8], name: &str) -> Result<InspectionReport> {
        let mut cursor = Cursor::new(bytes);
        self.run(&mut cursor, bytes.len() as u64, name)
    }

    fn intake(&self, src: &mut dyn ByteSource, size: u64, name: &str) -> Result<IntakeSummary> {
        if size == 0 {
            return Err(InspectError::EmptyInput);
        }
        if size > self.config.io.max_file_size {
            return Err(InspectError::TooLarge {
                size,
                limit: self.config.io.max_file_size,
            });
        }
        let sha256 = sha256_hex(src, self.config.io.read_buffer_size)?;
        let leading_bytes = read_at(src, 0, self.config.io.max_sniff_size as u64)?;
        let sniffed = CombinedSniffer::sniff(&leading_bytes, Some(name));
        Ok(IntakeSummary {
            file_name: name.to_string(),
            file_size: size,
            sha256,
            mime_hint: sniffed.mime_hint,
            leading_bytes,
            issues: sniffed.issues,
        })
    }

    fn identify(&self, intake: &IntakeSummary) -> Result<ContainerDescriptor> {
        let descriptor = identify(&intake.leading_bytes);
        if !descriptor.is_known() && !self.config.structure.allow_unknown_containers {
            return Err(InspectError::UnsupportedContainer {
                magic: hex::encode(&descriptor.magic_prefix),
            });
        }
        Ok(descriptor)
    }

    fn run(&self, src: &mut dyn ByteSource, size: u64, name: &str) -> Result<InspectionReport> {
        let span = tracing::info_span!("inspect", file = %name, size_bytes = size);
        let _g = span.enter();
        info!("start");

        debug!(phase = Stage::Intake.as_str(), "hash and sniff");
        let intake = self
            .intake(src, size, name)
            .map_err(|e| e.in_stage(Stage::Intake))?;

        debug!(phase = Stage::ContainerId.as_str(), "match signatures");
        let container = self
            .identify(&intake)
            .map_err(|e| e.in_stage(Stage::ContainerId))?;
        debug!(container = %container.family, confidence = %container.confidence, "identified");

        debug!(phase = Stage::StructuralWalk.as_str(), "enumerate records");
        let structure = structure::walk(src, &container, size, &self.config.structure)
            .map_err(|e| e.in_stage(Stage::StructuralWalk))?;

        debug!(phase = Stage::DeclaredMetadata.as_str(), "collaborator");
        let metadata = match self.extractor.extract(src, &container, &structure) {
            Ok(md) => md,
            Err(e) => {
                warn!(error = %e, "declared metadata unavailable");
                DeclaredMetadata::failed(e.to_string())
            }
        };

        debug!(phase = Stage::PayloadExtraction.as_str(), "decode textual records");
        let (payloads, payload_issues) =
            payloads::extract_all(src, &structure, &self.config.payloads);

        debug!(phase = Stage::PatternRecognition.as_str(), "match tool signatures");
        let ai_metadata = patterns::recognize(&payloads);

        debug!(phase = Stage::AnomalyScoring.as_str(), "score");
        let anomalies = score::score(&structure, &payloads, &self.config.anomaly);

        debug!(phase = Stage::ReportAssembly.as_str(), "assemble");
        let report = InspectionReport::assemble(
            intake,
            container,
            structure,
            metadata,
            payloads,
            ai_metadata,
            anomalies,
            payload_issues,
        );
        info!(
            records = report.summary().record_count,
            payloads = report.payloads().len(),
            flags = report.anomalies().flags.len(),
            "complete"
        );
        Ok(report)
    }
}

/// Inspect a file with the default configuration.
pub fn inspect_path<P: AsRef<Path>>(path: P) -> Result<InspectionReport> {
    Inspector::default().inspect_path(path)
}

/// Inspect an in-memory buffer with the default configuration.
pub fn inspect_bytes(bytes: &[u8], name: &str) -> Result<InspectionReport> {
    Inspector::default().inspect_bytes(bytes, name)
}
