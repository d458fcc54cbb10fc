//! BMP region walker.
//!
//! Three regions: the 14-byte file header, the DIB header with any colour
//! table up to the declared pixel offset, and the pixel array. The file
//! header's size field bounds the pixel array; bytes beyond it are trailing.

use super::{clamp_u32, WalkState};
use crate::core::inspect::{
    ChunkRecord, ContainerFamily, InspectIssue, IssueKind, RecordTag, StructuralReport,
};
use crate::error::Result;
use crate::inspect::config::StructureConfig;
use crate::inspect::io::read_into_at;
use std::io::{Read, Seek};

pub const FILE_HEADER_LEN: u64 = 14;
/// Smallest DIB header (`BITMAPCOREHEADER`).
const MIN_DIB_LEN: u64 = 12;

pub fn walk<R: Read + Seek + ?Sized>(
    src: &mut R,
    size: u64,
    config: &StructureConfig,
) -> Result<StructuralReport> {
    let mut state = WalkState::new(ContainerFamily::Bmp, size, config);

    let mut header = [0u8; FILE_HEADER_LEN as usize];
    let got = read_into_at(src, 0, &mut header, size)?;
    if got < header.len() {
        let mut rec = ChunkRecord::new(RecordTag::Block("FILE_HEADER".into()), 0, 0, got as u32, false);
        rec.clipped = true;
        state.push(rec, got as u64, 0);
        state.truncated(IssueKind::ClippedLength, 0, "file header runs past EOF");
        return Ok(state.finish());
    }
    let more = state.push(
        ChunkRecord::new(
            RecordTag::Block("FILE_HEADER".into()),
            0,
            0,
            FILE_HEADER_LEN as u32,
            false,
        ),
        FILE_HEADER_LEN,
        0,
    );
    if !more {
        state.remainder_non_pixel(FILE_HEADER_LEN);
        return Ok(state.finish());
    }

    let declared_size = u32::from_le_bytes([header[2], header[3], header[4], header[5]]) as u64;
    let pixel_offset = u32::from_le_bytes([header[10], header[11], header[12], header[13]]) as u64;

    if pixel_offset < FILE_HEADER_LEN + MIN_DIB_LEN {
        state.remainder_non_pixel(FILE_HEADER_LEN);
        state.issue(InspectIssue::at(
            IssueKind::BadMarker,
            10,
            format!("implausible pixel data offset {}", pixel_offset),
        ));
        return Ok(state.finish());
    }

    let dib_len = pixel_offset - FILE_HEADER_LEN;
    let mut dib = ChunkRecord::new(
        RecordTag::Block("DIB_HEADER".into()),
        FILE_HEADER_LEN,
        FILE_HEADER_LEN,
        clamp_u32(dib_len),
        false,
    );
    if pixel_offset > size {
        let available = size - FILE_HEADER_LEN;
        dib.length = clamp_u32(available);
        dib.clipped = true;
        state.push(dib, available, 0);
        state.truncated(
            IssueKind::ClippedLength,
            FILE_HEADER_LEN,
            format!("pixel data offset {} lies past EOF ({} bytes)", pixel_offset, size),
        );
        return Ok(state.finish());
    }
    if !state.push(dib, dib_len, 0) {
        state.remainder_non_pixel(pixel_offset);
        return Ok(state.finish());
    }

    // a zero or undersized size field is common; fall back to the physical size
    let logical_end = if declared_size >= pixel_offset && declared_size > 0 {
        declared_size
    } else {
        size
    };
    let pixel_end = logical_end.min(size);
    let pixels = pixel_end - pixel_offset;
    let more = state.push(
        ChunkRecord::new(
            RecordTag::Block("PIXEL_ARRAY".into()),
            pixel_offset,
            pixel_offset,
            clamp_u32(pixels),
            true,
        ),
        pixels,
        0,
    );
    if !more {
        state.remainder_non_pixel(pixel_end);
        return Ok(state.finish());
    }

    if logical_end > size {
        state.truncated(
            IssueKind::Truncated,
            size,
            format!("file header declares {} bytes, file has {}", logical_end, size),
        );
    } else {
        state.end_marker(pixel_end);
    }
    Ok(state.finish())
}
