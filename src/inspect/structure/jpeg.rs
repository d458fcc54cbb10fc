//! JPEG segment walker.
//!
//! After SOI (`FFD8`), markers are read one after another. Segments carry a
//! big-endian length that includes its own two bytes; standalone markers carry
//! none. Entropy-coded data starts after SOS and runs to the end of the file.

use super::{clamp_u32, WalkState};
use crate::core::inspect::{
    ChunkRecord, ContainerFamily, InspectIssue, IssueKind, RecordTag, StructuralReport,
};
use crate::error::Result;
use crate::inspect::config::StructureConfig;
use crate::inspect::io::read_into_at;
use std::io::{Read, Seek};
use tracing::trace;

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const COM: u8 = 0xFE;
pub const APP0: u8 = 0xE0;
pub const APP1: u8 = 0xE1;
pub const APP2: u8 = 0xE2;

/// Markers without a length field.
pub fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0xD0..=0xD7 | 0x01 | SOI)
}

/// Start-of-frame markers (`SOF0`..`SOF15` minus DHT, JPG and DAC).
pub fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

pub fn walk<R: Read + Seek + ?Sized>(
    src: &mut R,
    size: u64,
    config: &StructureConfig,
) -> Result<StructuralReport> {
    let mut state = WalkState::new(ContainerFamily::Jpeg, size, config);

    let mut soi = [0u8; 2];
    let got = read_into_at(src, 0, &mut soi, size)?;
    if got < 2 || soi != [0xFF, SOI] {
        state.remainder_non_pixel(0);
        state.truncated(IssueKind::BadMarker, 0, "missing SOI marker");
        return Ok(state.finish());
    }
    state.non_pixel(2);

    let mut pos = 2u64;
    loop {
        if pos >= size {
            state.truncated(IssueKind::MissingEndMarker, pos, "stream ended before EOI");
            break;
        }

        let mut marker = [0u8; 2];
        let got = read_into_at(src, pos, &mut marker, size)?;
        if marker[0] != 0xFF {
            state.remainder_non_pixel(pos);
            state.issue(InspectIssue::at(
                IssueKind::BadMarker,
                pos,
                format!("expected marker, found byte {:#04x}", marker[0]),
            ));
            break;
        }
        if got < 2 {
            state.non_pixel(got as u64);
            state.truncated(IssueKind::Truncated, pos, "stream ended inside a marker");
            break;
        }
        if marker[1] == 0xFF {
            // fill byte
            state.non_pixel(1);
            pos += 1;
            continue;
        }

        let code = marker[1];
        trace!(offset = pos, marker = code, "jpeg marker");

        if code == EOI {
            let rec = ChunkRecord::new(RecordTag::Marker(EOI), pos, pos + 2, 0, false);
            state.push(rec, 0, 2);
            state.end_marker(pos + 2);
            break;
        }

        if code == SOS {
            let data_offset = pos + 2;
            let scan = size - data_offset;
            let rec = ChunkRecord::new(RecordTag::Marker(SOS), pos, data_offset, clamp_u32(scan), true);
            state.push(rec, scan, 2);
            if scan >= 2 {
                let mut tail = [0u8; 2];
                read_into_at(src, size - 2, &mut tail, size)?;
                if tail == [0xFF, EOI] {
                    state.end_marker(size);
                }
            }
            break;
        }

        if is_standalone(code) {
            let rec = ChunkRecord::new(RecordTag::Marker(code), pos, pos + 2, 0, false);
            let more = state.push(rec, 0, 2);
            pos += 2;
            if !more {
                state.remainder_non_pixel(pos);
                break;
            }
            continue;
        }

        let mut len_field = [0u8; 2];
        let got = read_into_at(src, pos + 2, &mut len_field, size)?;
        if got < 2 {
            state.non_pixel(2 + got as u64);
            state.truncated(IssueKind::Truncated, pos, "stream ended inside a segment length");
            break;
        }
        let declared = u16::from_be_bytes(len_field) as u64;
        if declared < 2 {
            state.remainder_non_pixel(pos);
            state.issue(InspectIssue::at(
                IssueKind::BadMarker,
                pos,
                format!("segment 0xFF{:02X} declares invalid length {}", code, declared),
            ));
            break;
        }

        let payload = declared - 2;
        let data_offset = pos + 4;
        let mut rec = ChunkRecord::new(RecordTag::Marker(code), pos, data_offset, payload as u32, false);
        if data_offset + payload > size {
            let available = size - data_offset;
            rec.length = clamp_u32(available);
            rec.clipped = true;
            state.push(rec, available, 4);
            state.truncated(
                IssueKind::ClippedLength,
                pos,
                format!(
                    "segment 0xFF{:02X} declares {} bytes, {} available",
                    code, payload, available
                ),
            );
            break;
        }

        let more = state.push(rec, payload, 4);
        pos = data_offset + payload;
        if !more {
            state.remainder_non_pixel(pos);
            break;
        }
    }

    Ok(state.finish())
}
