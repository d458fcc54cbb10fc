//! RIFF/WEBP chunk walker.
//!
//! `RIFF | size (u32 LE) | WEBP`, then chunks of `FourCC | size (u32 LE) |
//! payload`, each payload padded to an even length. The RIFF size field marks
//! the logical end of the file.

use super::{clamp_u32, WalkState};
use crate::core::inspect::{ChunkRecord, ContainerFamily, IssueKind, RecordTag, StructuralReport};
use crate::error::Result;
use crate::inspect::config::StructureConfig;
use crate::inspect::io::read_into_at;
use std::io::{Read, Seek};
use tracing::trace;

const HEADER_LEN: u64 = 12;

/// Chunks carrying image bitstreams or alpha planes.
pub fn is_pixel_chunk(tag: &[u8; 4]) -> bool {
    matches!(tag, b"VP8 " | b"VP8L" | b"ALPH" | b"ANMF")
}

pub fn walk<R: Read + Seek + ?Sized>(
    src: &mut R,
    size: u64,
    config: &StructureConfig,
) -> Result<StructuralReport> {
    let mut state = WalkState::new(ContainerFamily::Webp, size, config);

    let mut header = [0u8; HEADER_LEN as usize];
    let got = read_into_at(src, 0, &mut header, size)?;
    if got < header.len() {
        state.remainder_non_pixel(0);
        state.truncated(IssueKind::ShortRead, 0, format!("only {} bytes of RIFF header", got));
        return Ok(state.finish());
    }
    state.non_pixel(HEADER_LEN);

    let riff_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as u64;
    let riff_end = 8 + riff_size;
    let walk_end = riff_end.min(size);

    let mut pos = HEADER_LEN;
    while pos < walk_end {
        let mut chunk_header = [0u8; 8];
        let got = read_into_at(src, pos, &mut chunk_header, size)?;
        if got < chunk_header.len() {
            state.non_pixel(got as u64);
            state.truncated(
                IssueKind::Truncated,
                pos,
                format!("partial chunk header ({} of 8 bytes)", got),
            );
            return Ok(state.finish());
        }

        let tag = [chunk_header[0], chunk_header[1], chunk_header[2], chunk_header[3]];
        let chunk_size =
            u32::from_le_bytes([chunk_header[4], chunk_header[5], chunk_header[6], chunk_header[7]]);
        let data_offset = pos + 8;
        let padded = chunk_size as u64 + (chunk_size as u64 & 1);
        let mut rec = ChunkRecord::new(
            RecordTag::FourCC(tag),
            pos,
            data_offset,
            chunk_size,
            is_pixel_chunk(&tag),
        );
        trace!(offset = pos, tag = %rec.type_tag, chunk_size, "riff chunk");

        let available = size - data_offset;
        if chunk_size as u64 > available {
            rec.length = clamp_u32(available);
            rec.clipped = true;
            let tag_name = rec.type_tag.to_string();
            state.push(rec, available, 8);
            state.truncated(
                IssueKind::ClippedLength,
                pos,
                format!(
                    "chunk {} declares {} bytes, {} available",
                    tag_name, chunk_size, available
                ),
            );
            return Ok(state.finish());
        }

        // a missing final pad byte is tolerated
        let pad = padded.min(available) - chunk_size as u64;
        let more = state.push(rec, chunk_size as u64, 8 + pad);
        pos = data_offset + chunk_size as u64 + pad;
        if !more {
            state.remainder_non_pixel(pos);
            return Ok(state.finish());
        }
    }

    if riff_end > size {
        state.truncated(
            IssueKind::Truncated,
            size,
            format!("RIFF header declares {} bytes, file has {}", riff_end, size),
        );
    } else {
        state.end_marker(pos);
    }
    Ok(state.finish())
}
