//! GIF block walker.
//!
//! Header and logical screen descriptor (plus global colour table) form the
//! `HDR` record. Extension blocks (`0x21`) are named by label, image
//! descriptors (`0x2C`) yield an `IMG` record followed by an `LZW` pixel
//! record, and the trailer (`0x3B`) ends the stream.

use super::{clamp_u32, WalkState};
use crate::core::inspect::{
    ChunkRecord, ContainerFamily, InspectIssue, IssueKind, RecordTag, StructuralReport,
};
use crate::error::Result;
use crate::inspect::config::StructureConfig;
use crate::inspect::io::read_into_at;
use std::io::{Read, Seek};
use tracing::trace;

const HEADER_LEN: u64 = 13;
const EXTENSION: u8 = 0x21;
const IMAGE: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

pub const LABEL_GCE: u8 = 0xF9;
pub const LABEL_COMMENT: u8 = 0xFE;
pub const LABEL_APPLICATION: u8 = 0xFF;
pub const LABEL_PLAIN_TEXT: u8 = 0x01;

/// Record name for an extension label.
pub fn extension_name(label: u8) -> &'static str {
    match label {
        LABEL_GCE => "GCE",
        LABEL_COMMENT => "COM",
        LABEL_APPLICATION => "APP",
        LABEL_PLAIN_TEXT => "PTE",
        _ => "EXT",
    }
}

/// Size of a colour table announced by a packed-fields byte.
fn color_table_len(packed: u8) -> u64 {
    if packed & 0x80 != 0 {
        3 * (1u64 << ((packed & 0x07) + 1))
    } else {
        0
    }
}

/// End of a sub-block chain starting at `pos`, and whether its terminator was seen.
fn skip_sub_blocks<R: Read + Seek + ?Sized>(
    src: &mut R,
    mut pos: u64,
    size: u64,
) -> std::io::Result<(u64, bool)> {
    let mut len = [0u8; 1];
    while pos < size {
        read_into_at(src, pos, &mut len, size)?;
        pos += 1;
        if len[0] == 0 {
            return Ok((pos, true));
        }
        pos += len[0] as u64;
    }
    Ok((pos.min(size), false))
}

/// Concatenated sub-block payloads from framed bytes; stops at the terminator.
pub fn deframe_sub_blocks(framed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(framed.len());
    let mut i = 0;
    while i < framed.len() {
        let n = framed[i] as usize;
        i += 1;
        if n == 0 {
            break;
        }
        let end = (i + n).min(framed.len());
        out.extend_from_slice(&framed[i..end]);
        i = end;
    }
    out
}

pub fn walk<R: Read + Seek + ?Sized>(
    src: &mut R,
    size: u64,
    config: &StructureConfig,
) -> Result<StructuralReport> {
    let mut state = WalkState::new(ContainerFamily::Gif, size, config);

    let mut header = [0u8; HEADER_LEN as usize];
    let got = read_into_at(src, 0, &mut header, size)?;
    if got < header.len() {
        state.remainder_non_pixel(0);
        state.truncated(IssueKind::ShortRead, 0, format!("only {} bytes of GIF header", got));
        return Ok(state.finish());
    }
    let hdr_len = HEADER_LEN + color_table_len(header[10]);
    let mut hdr = ChunkRecord::new(RecordTag::Block("HDR".into()), 0, 0, clamp_u32(hdr_len), false);
    if hdr_len > size {
        hdr.length = clamp_u32(size);
        hdr.clipped = true;
        state.push(hdr, size, 0);
        state.truncated(IssueKind::ClippedLength, 0, "global colour table runs past EOF");
        return Ok(state.finish());
    }
    if !state.push(hdr, hdr_len, 0) {
        state.remainder_non_pixel(hdr_len);
        return Ok(state.finish());
    }

    let mut pos = hdr_len;
    loop {
        if pos >= size {
            state.truncated(IssueKind::MissingEndMarker, pos, "stream ended before trailer");
            break;
        }
        let mut intro = [0u8; 2];
        let got = read_into_at(src, pos, &mut intro, size)?;
        trace!(offset = pos, introducer = intro[0], "gif block");

        let more = match intro[0] {
            TRAILER => {
                let rec = ChunkRecord::new(RecordTag::Block("TRAILER".into()), pos, pos + 1, 0, false);
                state.push(rec, 0, 1);
                state.end_marker(pos + 1);
                break;
            }
            EXTENSION => {
                if got < 2 {
                    state.non_pixel(got as u64);
                    state.truncated(IssueKind::Truncated, pos, "stream ended inside extension");
                    break;
                }
                let data_offset = pos + 2;
                let (end, terminated) = skip_sub_blocks(src, data_offset, size)?;
                let name = extension_name(intro[1]);
                let mut rec = ChunkRecord::new(
                    RecordTag::Block(name.into()),
                    pos,
                    data_offset,
                    clamp_u32(end - data_offset),
                    false,
                );
                if !terminated {
                    rec.clipped = true;
                    state.push(rec, end - data_offset, 2);
                    state.truncated(IssueKind::ClippedLength, pos, format!("{} extension runs past EOF", name));
                    break;
                }
                let more = state.push(rec, end - data_offset, 2);
                pos = end;
                more
            }
            IMAGE => {
                let mut desc = [0u8; 10];
                let got = read_into_at(src, pos, &mut desc, size)?;
                let desc_len = 10 + if got == desc.len() { color_table_len(desc[9]) } else { 0 };
                let mut img = ChunkRecord::new(
                    RecordTag::Block("IMG".into()),
                    pos,
                    pos + 1,
                    clamp_u32(desc_len - 1),
                    false,
                );
                if pos + desc_len > size {
                    let available = size - pos - 1;
                    img.length = clamp_u32(available);
                    img.clipped = true;
                    state.push(img, available, 1);
                    state.truncated(IssueKind::ClippedLength, pos, "image descriptor runs past EOF");
                    break;
                }
                if !state.push(img, desc_len - 1, 1) {
                    state.remainder_non_pixel(pos + desc_len);
                    break;
                }

                // LZW minimum code size, then image data sub-blocks
                let lzw_offset = pos + desc_len;
                if lzw_offset >= size {
                    state.truncated(IssueKind::Truncated, lzw_offset, "image data missing");
                    break;
                }
                let (end, terminated) = skip_sub_blocks(src, lzw_offset + 1, size)?;
                let mut lzw = ChunkRecord::new(
                    RecordTag::Block("LZW".into()),
                    lzw_offset,
                    lzw_offset,
                    clamp_u32(end - lzw_offset),
                    true,
                );
                if !terminated {
                    lzw.clipped = true;
                    state.push(lzw, end - lzw_offset, 0);
                    state.truncated(IssueKind::ClippedLength, lzw_offset, "image data runs past EOF");
                    break;
                }
                let more = state.push(lzw, end - lzw_offset, 0);
                pos = end;
                more
            }
            other => {
                state.remainder_non_pixel(pos);
                state.issue(InspectIssue::at(
                    IssueKind::BadMarker,
                    pos,
                    format!("unexpected block introducer {:#04x}", other),
                ));
                break;
            }
        };
        if !more {
            state.remainder_non_pixel(pos);
            break;
        }
    }

    Ok(state.finish())
}
