//! Synthetic container builders.
//!
//! Every builder produces a structurally valid file unless a method says
//! otherwise. Pixel payloads are filler bytes; nothing here is decodable
//! image data, which the inspector never needs.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// One PNG chunk with a correct CRC.
pub fn png_chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    let mut crc = flate2::Crc::new();
    crc.update(tag);
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
    out
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// PNG builder: signature and an 8-bit RGBA `IHDR` up front, `IEND` on build.
pub struct PngBuilder {
    bytes: Vec<u8>,
}

impl PngBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        let mut ihdr = width.to_be_bytes().to_vec();
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend(png_chunk(b"IHDR", &ihdr));
        Self { bytes }
    }

    pub fn chunk(mut self, tag: &[u8; 4], data: &[u8]) -> Self {
        self.bytes.extend(png_chunk(tag, data));
        self
    }

    pub fn idat(self, len: usize) -> Self {
        self.chunk(b"IDAT", &vec![0x5a; len])
    }

    pub fn text(self, keyword: &str, value: &str) -> Self {
        let data = [keyword.as_bytes(), b"\0", value.as_bytes()].concat();
        self.chunk(b"tEXt", &data)
    }

    pub fn ztxt(self, keyword: &str, value: &str) -> Self {
        let data = [keyword.as_bytes(), b"\0\0", &zlib(value.as_bytes())].concat();
        self.chunk(b"zTXt", &data)
    }

    /// Uncompressed `iTXt` with empty language tag and translated keyword.
    pub fn itxt(self, keyword: &str, value: &str) -> Self {
        let data = [keyword.as_bytes(), b"\0\0\0\0\0", value.as_bytes()].concat();
        self.chunk(b"iTXt", &data)
    }

    pub fn build(self) -> Vec<u8> {
        self.chunk(b"IEND", &[]).bytes
    }

    /// Without the `IEND` chunk.
    pub fn build_unterminated(self) -> Vec<u8> {
        self.bytes
    }
}

/// Signature, `IHDR`, one `IDAT` and `IEND`. The `IDAT` is large enough that
/// the non-pixel share stays below the default anomaly threshold.
pub fn minimal_png() -> Vec<u8> {
    PngBuilder::new(1, 1).idat(256).build()
}

pub fn jpeg_segment(marker: u8, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&((data.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// Baseline 16x8 RGB JPEG with JFIF header, optional comment and a filler scan.
pub fn sample_jpeg(comment: Option<&[u8]>) -> Vec<u8> {
    let mut jpg = vec![0xFF, 0xD8];
    jpg.extend(jpeg_segment(0xE0, b"JFIF\0\x01\x01\x01\0\x48\0\x48\0\0"));
    if let Some(c) = comment {
        jpg.extend(jpeg_segment(0xFE, c));
    }
    jpg.extend(jpeg_segment(
        0xC0,
        &[8, 0, 8, 0, 16, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1],
    ));
    jpg.extend(jpeg_segment(0xDA, &[3, 1, 0, 2, 0x11, 3, 0x11, 0, 0x3f, 0]));
    jpg.extend(vec![0x42; 300]);
    jpg.extend_from_slice(&[0xFF, 0xD9]);
    jpg
}

/// GIF89a 1x1 with a two-entry global colour table and optional comment.
pub fn sample_gif(comment: Option<&[u8]>) -> Vec<u8> {
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&[1, 0, 1, 0, 0x80, 0, 0]);
    gif.extend_from_slice(&[0, 0, 0, 0xff, 0xff, 0xff]);
    if let Some(c) = comment {
        gif.extend_from_slice(&[0x21, 0xFE]);
        for block in c.chunks(255) {
            gif.push(block.len() as u8);
            gif.extend_from_slice(block);
        }
        gif.push(0);
    }
    gif.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0]);
    gif.extend_from_slice(&[0x02, 0x02, 0x44, 0x01, 0x00]);
    gif.push(0x3B);
    gif
}

/// 24-bit BMP with a `BITMAPINFOHEADER`; rows padded to four bytes.
pub fn sample_bmp(width: u32, height: u32) -> Vec<u8> {
    let row = (width * 3).div_ceil(4) * 4;
    let pixels = row * height;
    let total = 54 + pixels;
    let mut bmp = b"BM".to_vec();
    bmp.extend_from_slice(&total.to_le_bytes());
    bmp.extend_from_slice(&[0; 4]);
    bmp.extend_from_slice(&54u32.to_le_bytes());
    bmp.extend_from_slice(&40u32.to_le_bytes());
    bmp.extend_from_slice(&(width as i32).to_le_bytes());
    bmp.extend_from_slice(&(height as i32).to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes());
    bmp.extend_from_slice(&24u16.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&pixels.to_le_bytes());
    bmp.extend_from_slice(&2835i32.to_le_bytes());
    bmp.extend_from_slice(&2835i32.to_le_bytes());
    bmp.extend_from_slice(&[0; 8]);
    bmp.extend(vec![0x7f; pixels as usize]);
    bmp
}

pub fn riff_chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// Wraps chunks into a `RIFF....WEBP` container.
pub fn webp(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    out.extend_from_slice(b"WEBP");
    out.extend(body);
    out
}

/// Lossless 4x3 WebP with a 200-byte filler bitstream.
pub fn sample_webp_lossless() -> Vec<u8> {
    let bits: u32 = 3 | (2 << 14);
    let mut data = vec![0x2f];
    data.extend_from_slice(&bits.to_le_bytes());
    data.extend(vec![0; 195]);
    webp(&[riff_chunk(b"VP8L", &data)])
}
