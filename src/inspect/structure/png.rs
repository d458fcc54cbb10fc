//! PNG chunk walker.
//!
//! Layout after the 8-byte signature: repeated `length (u32 BE) | type (4) |
//! data (length) | crc (u32 BE)`, CRC-32 computed over type and data. `IDAT`
//! data is pixel data; everything else, including the 12 bytes of framing of
//! every chunk, is non-pixel.

use super::{clamp_u32, WalkState};
use crate::core::inspect::{
    ChunkRecord, ContainerFamily, InspectIssue, IssueKind, RecordTag, StructuralReport,
};
use crate::error::Result;
use crate::inspect::config::StructureConfig;
use crate::inspect::io::{read_into_at, BoundedReader};
use std::io::{self, Read, Seek, SeekFrom};
use tracing::trace;

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

const CRC_BUFFER: usize = 64 * 1024;

pub fn walk<R: Read + Seek + ?Sized>(
    src: &mut R,
    size: u64,
    config: &StructureConfig,
) -> Result<StructuralReport> {
    let mut state = WalkState::new(ContainerFamily::Png, size, config);

    let mut sig = [0u8; 8];
    let got = read_into_at(src, 0, &mut sig, size)?;
    if got < SIGNATURE.len() {
        state.remainder_non_pixel(0);
        state.truncated(IssueKind::ShortRead, 0, format!("only {} bytes of PNG signature", got));
        return Ok(state.finish());
    }
    if sig != SIGNATURE {
        state.remainder_non_pixel(0);
        state.issue(InspectIssue::at(IssueKind::BadMarker, 0, "PNG signature mismatch"));
        return Ok(state.finish());
    }
    state.non_pixel(SIGNATURE.len() as u64);

    let mut pos = SIGNATURE.len() as u64;
    loop {
        if pos >= size {
            state.truncated(IssueKind::MissingEndMarker, pos, "stream ended before IEND");
            break;
        }

        let mut header = [0u8; 8];
        let got = read_into_at(src, pos, &mut header, size)?;
        if got < header.len() {
            state.non_pixel(got as u64);
            state.truncated(
                IssueKind::Truncated,
                pos,
                format!("partial chunk header ({} of 8 bytes)", got),
            );
            break;
        }

        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let tag = [header[4], header[5], header[6], header[7]];
        let type_tag = RecordTag::FourCC(tag);
        let data_offset = pos + 8;
        let declared_end = data_offset + length as u64 + 4;
        let mut rec = ChunkRecord::new(type_tag.clone(), pos, data_offset, length, &tag == b"IDAT");
        trace!(offset = pos, %type_tag, length, "png chunk");

        if declared_end > size {
            let available = size - data_offset;
            let data_bytes = available.min(length as u64);
            let crc_bytes = available - data_bytes;
            rec.length = clamp_u32(data_bytes);
            rec.clipped = true;
            state.push(rec, data_bytes, 8 + crc_bytes);
            state.truncated(
                IssueKind::ClippedLength,
                pos,
                format!(
                    "chunk {} declares {} data bytes + CRC, {} available",
                    type_tag, length, available
                ),
            );
            break;
        }

        if config.verify_crc {
            let mut stored = [0u8; 4];
            read_into_at(src, data_offset + length as u64, &mut stored, size)?;
            let stored = u32::from_be_bytes(stored);
            let computed = chunk_crc(src, &tag, data_offset, length as u64)?;
            rec.crc_valid = Some(stored == computed);
            if stored != computed {
                state.issue(InspectIssue::at(
                    IssueKind::CrcMismatch,
                    pos,
                    format!(
                        "chunk {}: stored CRC {:08x}, computed {:08x}",
                        type_tag, stored, computed
                    ),
                ));
            }
        }

        let more = state.push(rec, length as u64, 12);
        pos = declared_end;
        if &tag == b"IEND" {
            state.end_marker(pos);
            break;
        }
        if !more {
            state.remainder_non_pixel(pos);
            break;
        }
    }

    Ok(state.finish())
}

/// CRC-32 over the chunk type and `len` data bytes at `data_offset`, streamed.
fn chunk_crc<R: Read + Seek + ?Sized>(
    src: &mut R,
    tag: &[u8; 4],
    data_offset: u64,
    len: u64,
) -> io::Result<u32> {
    let mut crc = flate2::Crc::new();
    crc.update(tag);
    src.seek(SeekFrom::Start(data_offset))?;
    let mut reader = BoundedReader::new(src, len);
    let mut buf = vec![0u8; CRC_BUFFER.min(len.max(1) as usize)];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        crc.update(&buf[..n]);
    }
    Ok(crc.sum())
}
