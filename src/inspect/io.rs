//! Bounded I/O utilities for safe file reading.
//!
//! Every read performed by the pipeline goes through these helpers: reads are
//! positioned explicitly, capped in length, and short reads at EOF are
//! reported to the caller instead of failing.

use crate::error::{InspectError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// A readable, seekable byte stream.
pub trait ByteSource: Read + Seek {}

impl<T: Read + Seek + ?Sized> ByteSource for T {}

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            trace!("BoundedReader reached limit of {} bytes", self.limit);
            return Ok(0); // EOF
        }

        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

/// File opened for inspection, with its size checked against a ceiling.
///
/// The handle is released when the reader is dropped, on every exit path.
pub struct SafeFileReader {
    file: File,
    size: u64,
}

impl SafeFileReader {
    pub fn open<P: AsRef<Path>>(path: P, max_file_size: u64) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening file for inspection: {:?}", path);

        let file = File::open(path)?;
        let size = file.metadata()?.len();

        if size > max_file_size {
            warn!("File too large: {} bytes (limit: {})", size, max_file_size);
            return Err(InspectError::TooLarge {
                size,
                limit: max_file_size,
            });
        }

        info!("Opened {:?} ({} bytes)", path, size);
        Ok(Self { file, size })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

/// Read up to `len` bytes starting at `offset`. Returns fewer bytes at EOF.
pub fn read_at<R: Read + Seek + ?Sized>(src: &mut R, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    src.seek(SeekFrom::Start(offset))?;
    let mut reader = BoundedReader::new(src, len);
    let mut data = Vec::with_capacity(len.min(1 << 20) as usize);
    reader.read_to_end(&mut data)?;
    Ok(data)
}

/// Fill `buf` from `offset`, never reading at or past `end`; returns the count read.
///
/// A stream longer than the declared `end` is treated as ending there.
pub fn read_into_at<R: Read + Seek + ?Sized>(
    src: &mut R,
    offset: u64,
    buf: &mut [u8],
    end: u64,
) -> io::Result<usize> {
    let want = end.saturating_sub(offset).min(buf.len() as u64) as usize;
    if want == 0 {
        return Ok(0);
    }
    let buf = &mut buf[..want];
    src.seek(SeekFrom::Start(offset))?;
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Raw bytes of a previously reported region.
///
/// Read-only and bounded: the range must lie entirely within `size`.
pub fn read_range<R: Read + Seek + ?Sized>(
    src: &mut R,
    offset: u64,
    length: u64,
    size: u64,
) -> Result<Vec<u8>> {
    let end = offset.checked_add(length);
    if end.map_or(true, |end| end > size) {
        return Err(InspectError::InvalidRange {
            offset,
            length,
            size,
        });
    }
    let data = read_at(src, offset, length)?;
    if (data.len() as u64) < length {
        return Err(InspectError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes at {:#x}, got {}", length, offset, data.len()),
        )));
    }
    Ok(data)
}

/// Lowercase hex SHA-256 of the whole stream, read in `buf_size` pieces.
pub fn sha256_hex<R: Read + Seek + ?Sized>(src: &mut R, buf_size: usize) -> io::Result<String> {
    src.seek(SeekFrom::Start(0))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; buf_size.max(512)];
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Utility functions for path-based access.
pub struct IOUtils;

impl IOUtils {
    /// Open `path` and read one byte range from it.
    pub fn read_file_range<P: AsRef<Path>>(path: P, offset: u64, length: u64) -> Result<Vec<u8>> {
        let mut reader = SafeFileReader::open(path, u64::MAX)?;
        let size = reader.size();
        read_range(reader.file_mut(), offset, length, size)
    }
}
