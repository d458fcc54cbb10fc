//! Declared-metadata collaborator.
//!
//! The orchestrator treats metadata extraction as a black box behind
//! [`MetadataExtractor`]. [`HeaderMetadataReader`] is the built-in,
//! header-level implementation: image properties and a handful of tags read
//! from the records the structural walk already located. It does not decode
//! EXIF/IPTC/XMP tag sets and never produces GPS data; a full reader can be
//! plugged in instead.

use crate::core::inspect::{
    ChunkRecord, ContainerDescriptor, ContainerFamily, DeclaredMetadata, ImageProperties,
    StructuralReport,
};
use crate::error::{InspectError, Result};
use crate::inspect::io::{read_at, ByteSource};
use crate::inspect::structure::jpeg;
use tracing::debug;

/// Source of declared metadata for one file.
pub trait MetadataExtractor {
    fn extract(
        &self,
        source: &mut dyn ByteSource,
        container: &ContainerDescriptor,
        structure: &StructuralReport,
    ) -> Result<DeclaredMetadata>;
}

/// Header-level reader for the supported container families.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderMetadataReader;

const METERS_PER_INCH: f64 = 0.0254;
const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";
const XMP_APP1_PREFIX: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

fn head(src: &mut dyn ByteSource, rec: &ChunkRecord, max: u64) -> Result<Vec<u8>> {
    Ok(read_at(src, rec.data_offset, (rec.length as u64).min(max))?)
}

fn be_u16(b: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([b[at], b[at + 1]])
}

fn be_u32(b: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_u24(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], 0])
}

fn missing(what: &str) -> InspectError {
    InspectError::Metadata(format!("{} not found", what))
}

/// Round to 4 decimals so resolution values serialize stably.
fn dpi_pair(x: f64, y: f64) -> Option<[f64; 2]> {
    let r = |v: f64| (v * 10_000.0).round() / 10_000.0;
    (x > 0.0 && y > 0.0).then(|| [r(x), r(y)])
}

impl HeaderMetadataReader {
    fn png(src: &mut dyn ByteSource, structure: &StructuralReport) -> Result<DeclaredMetadata> {
        let mut md = DeclaredMetadata::default();
        let ihdr = structure.find("IHDR").next().ok_or_else(|| missing("IHDR chunk"))?;
        let h = head(src, ihdr, 13)?;
        if h.len() < 13 {
            return Err(InspectError::Metadata("IHDR chunk too short".into()));
        }
        let (bit_depth, color_type, interlace) = (h[8], h[9], h[12]);
        let mode = match (color_type, bit_depth) {
            (0, 1) => "1",
            (0, 16) => "I;16",
            (0, _) => "L",
            (2, _) => "RGB",
            (3, _) => "P",
            (4, _) => "LA",
            (6, _) => "RGBA",
            _ => "unknown",
        };
        md.tags.insert("PNG:BitDepth".into(), (bit_depth as i64).into());
        md.tags.insert("PNG:ColorType".into(), (color_type as i64).into());
        md.tags.insert("PNG:Interlace".into(), (interlace != 0).into());

        let mut props = ImageProperties {
            format: "PNG".into(),
            mode: mode.into(),
            width: be_u32(&h, 0),
            height: be_u32(&h, 4),
            dpi: None,
            has_color_profile: false,
        };

        for rec in &structure.records {
            let Some(cc) = rec.type_tag.fourcc() else {
                continue;
            };
            match cc {
                b"pHYs" => {
                    let b = head(src, rec, 9)?;
                    if b.len() == 9 && b[8] == 1 {
                        props.dpi = dpi_pair(
                            be_u32(&b, 0) as f64 * METERS_PER_INCH,
                            be_u32(&b, 4) as f64 * METERS_PER_INCH,
                        );
                    }
                }
                b"iCCP" | b"sRGB" => props.has_color_profile = true,
                b"tIME" => {
                    let b = head(src, rec, 7)?;
                    if b.len() == 7 {
                        md.tags.insert(
                            "PNG:ModificationTime".into(),
                            format!(
                                "{:04}:{:02}:{:02} {:02}:{:02}:{:02}",
                                be_u16(&b, 0),
                                b[2],
                                b[3],
                                b[4],
                                b[5],
                                b[6]
                            )
                            .into(),
                        );
                    }
                }
                b"eXIf" => {
                    md.tags.insert("EXIF:Present".into(), true.into());
                    md.tags.insert("EXIF:ByteSize".into(), rec.length.into());
                }
                b"iTXt" => {
                    let b = head(src, rec, XMP_KEYWORD.len() as u64 + 1)?;
                    if b.starts_with(XMP_KEYWORD) {
                        md.tags.insert("XMP:Present".into(), true.into());
                    }
                }
                _ => {}
            }
        }
        md.image_properties = Some(props);
        Ok(md)
    }

    fn jpeg(src: &mut dyn ByteSource, structure: &StructuralReport) -> Result<DeclaredMetadata> {
        let mut md = DeclaredMetadata::default();
        let mut props: Option<ImageProperties> = None;
        let mut dpi = None;
        let mut icc = false;

        for rec in &structure.records {
            let Some(marker) = rec.type_tag.marker() else {
                continue;
            };
            match marker {
                m if jpeg::is_sof(m) => {
                    let b = head(src, rec, 6)?;
                    if b.len() < 6 || props.is_some() {
                        continue;
                    }
                    let components = b[5];
                    md.tags.insert("JPEG:BitsPerSample".into(), (b[0] as i64).into());
                    md.tags.insert("JPEG:ColorComponents".into(), (components as i64).into());
                    md.tags.insert(
                        "JPEG:Process".into(),
                        if matches!(m, 0xC2 | 0xC6 | 0xCA | 0xCE) {
                            "progressive"
                        } else {
                            "baseline"
                        }
                        .into(),
                    );
                    props = Some(ImageProperties {
                        format: "JPEG".into(),
                        mode: match components {
                            1 => "L",
                            3 => "RGB",
                            4 => "CMYK",
                            _ => "unknown",
                        }
                        .into(),
                        width: be_u16(&b, 3) as u32,
                        height: be_u16(&b, 1) as u32,
                        dpi: None,
                        has_color_profile: false,
                    });
                }
                jpeg::APP0 => {
                    let b = head(src, rec, 12)?;
                    if b.len() == 12 && b.starts_with(b"JFIF\0") {
                        md.tags.insert("JFIF:Version".into(), format!("{}.{:02}", b[5], b[6]).into());
                        let (x, y) = (be_u16(&b, 8) as f64, be_u16(&b, 10) as f64);
                        dpi = match b[7] {
                            1 => dpi_pair(x, y),
                            2 => dpi_pair(x * 2.54, y * 2.54),
                            _ => dpi,
                        };
                    }
                }
                jpeg::APP1 => {
                    let b = head(src, rec, XMP_APP1_PREFIX.len() as u64)?;
                    if b.starts_with(b"Exif\0\0") {
                        md.tags.insert("EXIF:Present".into(), true.into());
                        md.tags.insert("EXIF:ByteSize".into(), rec.length.into());
                    } else if b.starts_with(XMP_APP1_PREFIX) {
                        md.tags.insert("XMP:Present".into(), true.into());
                    }
                }
                jpeg::APP2 => {
                    let b = head(src, rec, 12)?;
                    if b.starts_with(b"ICC_PROFILE\0") {
                        icc = true;
                    }
                }
                0xED => {
                    let b = head(src, rec, 14)?;
                    if b.starts_with(b"Photoshop 3.0\0") {
                        md.tags.insert("IPTC:Present".into(), true.into());
                    }
                }
                _ => {}
            }
        }

        let mut props = props.ok_or_else(|| missing("start-of-frame segment"))?;
        props.dpi = dpi;
        props.has_color_profile = icc;
        md.image_properties = Some(props);
        Ok(md)
    }

    fn gif(src: &mut dyn ByteSource, structure: &StructuralReport) -> Result<DeclaredMetadata> {
        let mut md = DeclaredMetadata::default();
        let hdr = structure.find("HDR").next().ok_or_else(|| missing("GIF header"))?;
        let b = head(src, hdr, 13)?;
        if b.len() < 13 {
            return Err(InspectError::Metadata("GIF header too short".into()));
        }
        md.tags.insert(
            "GIF:Version".into(),
            String::from_utf8_lossy(&b[3..6]).into_owned().into(),
        );
        md.tags.insert("GIF:GlobalColorTable".into(), (b[10] & 0x80 != 0).into());
        md.tags.insert(
            "GIF:FrameCount".into(),
            (structure.find("IMG").count() as i64).into(),
        );
        md.image_properties = Some(ImageProperties {
            format: "GIF".into(),
            mode: "P".into(),
            width: le_u16(&b, 6) as u32,
            height: le_u16(&b, 8) as u32,
            dpi: None,
            has_color_profile: false,
        });
        Ok(md)
    }

    fn bmp(src: &mut dyn ByteSource, structure: &StructuralReport) -> Result<DeclaredMetadata> {
        let mut md = DeclaredMetadata::default();
        let dib = structure.find("DIB_HEADER").next().ok_or_else(|| missing("DIB header"))?;
        let b = head(src, dib, 40)?;
        if b.len() < 12 {
            return Err(InspectError::Metadata("DIB header too short".into()));
        }
        let header_size = le_u32(&b, 0);
        let (width, height, bpp, dpi) = if header_size == 12 {
            (le_u16(&b, 4) as u32, le_u16(&b, 6) as u32, le_u16(&b, 10), None)
        } else if b.len() >= 40 {
            let w = le_u32(&b, 4) as i32;
            let h = le_u32(&b, 8) as i32;
            md.tags.insert("BMP:Compression".into(), le_u32(&b, 16).into());
            let x = le_u32(&b, 24) as i32 as f64 * METERS_PER_INCH;
            let y = le_u32(&b, 28) as i32 as f64 * METERS_PER_INCH;
            (w.unsigned_abs(), h.unsigned_abs(), le_u16(&b, 14), dpi_pair(x, y))
        } else {
            return Err(InspectError::Metadata("DIB header too short".into()));
        };
        md.tags.insert("BMP:HeaderSize".into(), header_size.into());
        md.tags.insert("BMP:BitsPerPixel".into(), (bpp as i64).into());
        md.image_properties = Some(ImageProperties {
            format: "BMP".into(),
            mode: match bpp {
                1 => "1",
                2 | 4 | 8 => "P",
                16 | 24 | 32 => "RGB",
                _ => "unknown",
            }
            .into(),
            width,
            height,
            dpi,
            has_color_profile: false,
        });
        Ok(md)
    }

    fn webp(src: &mut dyn ByteSource, structure: &StructuralReport) -> Result<DeclaredMetadata> {
        let mut md = DeclaredMetadata::default();
        let mut canvas: Option<(u32, u32, bool)> = None;
        let mut bitstream: Option<(u32, u32, bool)> = None;
        let mut icc = false;

        for rec in &structure.records {
            let Some(cc) = rec.type_tag.fourcc() else {
                continue;
            };
            match cc {
                b"VP8X" => {
                    let b = head(src, rec, 10)?;
                    if b.len() == 10 {
                        let flags = b[0];
                        icc |= flags & 0x20 != 0;
                        md.tags.insert("WEBP:Animated".into(), (flags & 0x02 != 0).into());
                        canvas = Some((le_u24(&b, 4) + 1, le_u24(&b, 7) + 1, flags & 0x10 != 0));
                    }
                }
                b"VP8 " if bitstream.is_none() => {
                    let b = head(src, rec, 10)?;
                    if b.len() == 10 && b[3..6] == [0x9d, 0x01, 0x2a] {
                        md.tags.insert("WEBP:Compression".into(), "lossy".into());
                        bitstream = Some((
                            (le_u16(&b, 6) & 0x3fff) as u32,
                            (le_u16(&b, 8) & 0x3fff) as u32,
                            false,
                        ));
                    }
                }
                b"VP8L" if bitstream.is_none() => {
                    let b = head(src, rec, 5)?;
                    if b.len() == 5 && b[0] == 0x2f {
                        let bits = le_u32(&b, 1);
                        md.tags.insert("WEBP:Compression".into(), "lossless".into());
                        bitstream = Some((
                            (bits & 0x3fff) + 1,
                            ((bits >> 14) & 0x3fff) + 1,
                            (bits >> 28) & 1 == 1,
                        ));
                    }
                }
                b"ICCP" => icc = true,
                b"EXIF" => {
                    md.tags.insert("EXIF:Present".into(), true.into());
                    md.tags.insert("EXIF:ByteSize".into(), rec.length.into());
                }
                b"XMP " => {
                    md.tags.insert("XMP:Present".into(), true.into());
                }
                _ => {}
            }
        }

        let (width, height, alpha) = canvas
            .or(bitstream)
            .ok_or_else(|| missing("VP8X, VP8 or VP8L chunk"))?;
        md.image_properties = Some(ImageProperties {
            format: "WEBP".into(),
            mode: if alpha { "RGBA" } else { "RGB" }.into(),
            width,
            height,
            dpi: None,
            has_color_profile: icc,
        });
        Ok(md)
    }
}

impl MetadataExtractor for HeaderMetadataReader {
    fn extract(
        &self,
        source: &mut dyn ByteSource,
        container: &ContainerDescriptor,
        structure: &StructuralReport,
    ) -> Result<DeclaredMetadata> {
        let md = match container.family {
            ContainerFamily::Png => Self::png(source, structure)?,
            ContainerFamily::Jpeg => Self::jpeg(source, structure)?,
            ContainerFamily::Gif => Self::gif(source, structure)?,
            ContainerFamily::Bmp => Self::bmp(source, structure)?,
            ContainerFamily::Webp => Self::webp(source, structure)?,
            ContainerFamily::Unknown => {
                return Err(InspectError::Metadata(
                    "no header reader for unrecognised container".into(),
                ))
            }
        };
        debug!(tags = md.tags.len(), "declared metadata read");
        Ok(md)
    }
}
