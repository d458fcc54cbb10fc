//! Format-specific structural walkers.
//!
//! Each walker enumerates the chunks, segments or blocks of one container
//! family into an ordered [`StructuralReport`], splitting the file into pixel
//! and non-pixel byte ranges. Malformed input never fails a walk: lengths that
//! overrun EOF are clipped and recorded as issues. Only I/O errors of the
//! underlying stream propagate.

pub mod bmp;
pub mod gif;
pub mod jpeg;
pub mod png;
pub mod riff;

use crate::core::inspect::{
    ChunkRecord, ContainerDescriptor, ContainerFamily, InspectIssue, IssueKind, StructuralReport,
};
use crate::error::Result;
use crate::inspect::config::StructureConfig;
use std::io::{Read, Seek};
use tracing::{debug, warn};

/// Walk the structure of `src` according to the identified container family.
pub fn walk<R: Read + Seek + ?Sized>(
    src: &mut R,
    descriptor: &ContainerDescriptor,
    file_size: u64,
    config: &StructureConfig,
) -> Result<StructuralReport> {
    let report = match descriptor.family {
        ContainerFamily::Png => png::walk(src, file_size, config)?,
        ContainerFamily::Jpeg => jpeg::walk(src, file_size, config)?,
        ContainerFamily::Webp => riff::walk(src, file_size, config)?,
        ContainerFamily::Gif => gif::walk(src, file_size, config)?,
        ContainerFamily::Bmp => bmp::walk(src, file_size, config)?,
        ContainerFamily::Unknown => {
            let mut report = StructuralReport::minimal(ContainerFamily::Unknown, file_size);
            report.issues.push(InspectIssue::new(
                IssueKind::Unsupported,
                None,
                "no structural walker for unrecognised container",
            ));
            report
        }
    };
    debug!(
        format = %report.format,
        records = report.records.len(),
        pixel = report.pixel_bytes,
        non_pixel = report.non_pixel_bytes,
        truncated = report.truncated,
        "structural walk complete"
    );
    Ok(report)
}

/// Saturating conversion for record lengths; byte accounting stays in `u64`.
pub(crate) fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Mutable state shared by the walkers while a report is being built.
pub(crate) struct WalkState {
    report: StructuralReport,
    max_records: usize,
}

impl WalkState {
    pub(crate) fn new(format: ContainerFamily, total_bytes: u64, config: &StructureConfig) -> Self {
        Self {
            report: StructuralReport::minimal(format, total_bytes),
            max_records: config.max_records,
        }
    }

    /// Record `rec`; its payload counts as pixel or non-pixel per the record,
    /// `overhead` (headers, CRCs, padding) always as non-pixel.
    ///
    /// Returns `false` once the record limit is reached.
    pub(crate) fn push(&mut self, rec: ChunkRecord, data_bytes: u64, overhead: u64) -> bool {
        if rec.is_pixel_data {
            self.report.pixel_bytes += data_bytes;
        } else {
            self.report.non_pixel_bytes += data_bytes;
        }
        self.report.non_pixel_bytes += overhead;
        self.report.records.push(rec);
        if self.report.records.len() >= self.max_records {
            self.issue(InspectIssue::new(
                IssueKind::Unsupported,
                None,
                format!("record limit of {} reached; walk stopped", self.max_records),
            ));
            return false;
        }
        true
    }

    /// Count bytes outside any record as non-pixel.
    pub(crate) fn non_pixel(&mut self, bytes: u64) {
        self.report.non_pixel_bytes += bytes;
    }

    /// Attribute everything from `pos` to EOF as non-pixel (unparsed remainder).
    pub(crate) fn remainder_non_pixel(&mut self, pos: u64) {
        let rest = self.report.total_bytes.saturating_sub(pos);
        self.report.non_pixel_bytes += rest;
    }

    pub(crate) fn issue(&mut self, issue: InspectIssue) {
        warn!(kind = %issue.kind, offset = ?issue.offset, "{}", issue.message);
        self.report.issues.push(issue);
    }

    pub(crate) fn truncated(&mut self, kind: IssueKind, offset: u64, message: impl Into<String>) {
        self.report.truncated = true;
        self.issue(InspectIssue::at(kind, offset, message));
    }

    /// The format's end marker finished at `end`; anything after is trailing data.
    pub(crate) fn end_marker(&mut self, end: u64) {
        self.report.end_marker_found = true;
        let trailing = self.report.total_bytes.saturating_sub(end);
        if trailing > 0 {
            self.report.trailing_bytes = trailing;
            self.report.non_pixel_bytes += trailing;
            self.issue(InspectIssue::at(
                IssueKind::TrailingData,
                end,
                format!("{} bytes after end marker", trailing),
            ));
        }
    }

    pub(crate) fn finish(self) -> StructuralReport {
        self.report
    }
}
