//! Opaque payload extraction and classification.
//!
//! Textual records (PNG `tEXt`/`zTXt`/`iTXt`, JPEG `COM`, GIF comment
//! extensions) are read once, bounded, and pushed through an ordered decode
//! chain: keyword split, inflate, text decode, JSON parse. Anything that falls
//! out of the chain is kept as a binary payload with its entropy.

use crate::core::inspect::{
    ChunkRecord, ContainerFamily, DecodeStep, InspectIssue, IssueKind, PayloadContent,
    PayloadRecord, RecordTag, StructuralReport,
};
use crate::entropy::shannon_entropy;
use crate::inspect::config::PayloadConfig;
use crate::inspect::io::{read_at, BoundedReader};
use crate::inspect::patterns::payload_shape;
use crate::inspect::structure::{gif, jpeg};
use flate2::read::ZlibDecoder;
use serde_json::Value;
use std::borrow::Cow;
use std::io::{Read, Seek};
use tracing::{debug, trace};

/// Kind of textual record, which selects the decode chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextualKind {
    /// PNG `tEXt`: keyword, NUL, Latin-1 text.
    Text,
    /// PNG `zTXt`: keyword, NUL, method, deflate stream.
    Compressed,
    /// PNG `iTXt`: keyword, NUL, flag, method, language, NUL, translated keyword, NUL, UTF-8 text.
    International,
    JpegComment,
    GifComment,
}

impl TextualKind {
    /// Textual kind of a record, or `None` for records that carry no text.
    pub fn of(record: &ChunkRecord, family: ContainerFamily, config: &PayloadConfig) -> Option<Self> {
        match (&record.type_tag, family) {
            (RecordTag::FourCC(cc), ContainerFamily::Png) => match cc {
                b"tEXt" => Some(TextualKind::Text),
                b"zTXt" => Some(TextualKind::Compressed),
                b"iTXt" => Some(TextualKind::International),
                _ => None,
            },
            (RecordTag::Marker(jpeg::COM), ContainerFamily::Jpeg) if config.jpeg_comments => {
                Some(TextualKind::JpegComment)
            }
            (RecordTag::Block(name), ContainerFamily::Gif) if config.gif_comments && name == "COM" => {
                Some(TextualKind::GifComment)
            }
            _ => None,
        }
    }

    fn has_keyword(&self) -> bool {
        matches!(
            self,
            TextualKind::Text | TextualKind::Compressed | TextualKind::International
        )
    }
}

/// Why the decode chain gave up on a payload.
#[derive(Debug)]
enum DecodeFailure {
    NoSeparator,
    EmptyKeyword,
    Malformed(&'static str),
    Inflate(String),
}

impl DecodeFailure {
    fn issue(&self, offset: u64, source: &str) -> InspectIssue {
        match self {
            DecodeFailure::Inflate(e) => InspectIssue::at(
                IssueKind::InflateFailed,
                offset,
                format!("{}: {}", source, e),
            ),
            DecodeFailure::NoSeparator => InspectIssue::at(
                IssueKind::UndecodablePayload,
                offset,
                format!("{}: no keyword separator", source),
            ),
            DecodeFailure::EmptyKeyword => InspectIssue::at(
                IssueKind::UndecodablePayload,
                offset,
                format!("{}: empty keyword", source),
            ),
            DecodeFailure::Malformed(what) => InspectIssue::at(
                IssueKind::UndecodablePayload,
                offset,
                format!("{}: {}", source, what),
            ),
        }
    }
}

/// Result of extracting one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub payload: PayloadRecord,
    pub issues: Vec<InspectIssue>,
}

/// Working state of the decode chain for one record.
struct Chain<'a> {
    config: &'a PayloadConfig,
    offset: u64,
    steps: Vec<DecodeStep>,
    issues: Vec<InspectIssue>,
}

impl<'a> Chain<'a> {
    fn step(&mut self, step: DecodeStep) {
        self.steps.push(step);
    }

    /// Split at the first NUL; the keyword must be non-empty.
    fn keyword_split<'b>(&mut self, raw: &'b [u8]) -> Result<(String, &'b [u8]), DecodeFailure> {
        let nul = memchr::memchr(0, raw).ok_or(DecodeFailure::NoSeparator)?;
        if nul == 0 {
            return Err(DecodeFailure::EmptyKeyword);
        }
        self.step(DecodeStep::KeywordSplit);
        let keyword = encoding_rs::mem::decode_latin1(&raw[..nul]).into_owned();
        Ok((keyword, &raw[nul + 1..]))
    }

    fn inflate(&mut self, compressed: &[u8]) -> Result<Vec<u8>, DecodeFailure> {
        let limit = self.config.max_inflated_bytes;
        let mut reader = BoundedReader::new(ZlibDecoder::new(compressed), limit.saturating_add(1));
        let mut out = Vec::new();
        reader
            .read_to_end(&mut out)
            .map_err(|e| DecodeFailure::Inflate(e.to_string()))?;
        if out.len() as u64 > limit {
            out.truncate(limit as usize);
            self.issues.push(InspectIssue::at(
                IssueKind::PayloadCapped,
                self.offset,
                format!("inflated text cut at {} bytes", limit),
            ));
        }
        self.step(DecodeStep::Inflate);
        Ok(out)
    }

    /// UTF-8, falling back to Latin-1. Never fails.
    fn text_decode(&mut self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                self.step(DecodeStep::Utf8);
                s.to_string()
            }
            Err(_) => {
                self.step(DecodeStep::Latin1);
                self.issues.push(InspectIssue::at(
                    IssueKind::LossyDecode,
                    self.offset,
                    "payload is not valid UTF-8; decoded as Latin-1",
                ));
                encoding_rs::mem::decode_latin1(bytes).into_owned()
            }
        }
    }

    fn classify(&mut self, text: String) -> PayloadContent {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(content) => {
                self.step(DecodeStep::Json);
                PayloadContent::Json { content }
            }
            Err(_) => PayloadContent::Text { content: text },
        }
    }

    /// Keyword and compressed-or-plain body of an `iTXt` record.
    fn itxt_body<'b>(&mut self, rest: &'b [u8]) -> Result<Cow<'b, [u8]>, DecodeFailure> {
        if rest.len() < 2 {
            return Err(DecodeFailure::Malformed("iTXt header too short"));
        }
        let (flag, method) = (rest[0], rest[1]);
        let after = &rest[2..];
        let lang_end = memchr::memchr(0, after)
            .ok_or(DecodeFailure::Malformed("iTXt language tag not terminated"))?;
        let after = &after[lang_end + 1..];
        let tk_end = memchr::memchr(0, after)
            .ok_or(DecodeFailure::Malformed("iTXt translated keyword not terminated"))?;
        let body = &after[tk_end + 1..];
        match (flag, method) {
            (0, _) => Ok(Cow::Borrowed(body)),
            (1, 0) => self.inflate(body).map(Cow::Owned),
            (1, _) => Err(DecodeFailure::Inflate(format!("unknown compression method {}", method))),
            _ => Err(DecodeFailure::Malformed("invalid iTXt compression flag")),
        }
    }

    /// Run the chain; returns `(keyword, content)`.
    fn run(
        &mut self,
        kind: TextualKind,
        raw: &[u8],
    ) -> Result<(Option<String>, PayloadContent), DecodeFailure> {
        let (keyword, body): (Option<String>, Cow<'_, [u8]>) = match kind {
            TextualKind::Text => {
                let (k, v) = self.keyword_split(raw)?;
                (Some(k), Cow::Borrowed(v))
            }
            TextualKind::Compressed => {
                let (k, v) = self.keyword_split(raw)?;
                match v.split_first() {
                    Some((0, stream)) => (Some(k), Cow::Owned(self.inflate(stream)?)),
                    Some((m, _)) => {
                        return Err(DecodeFailure::Inflate(format!("unknown compression method {}", m)))
                    }
                    None => return Err(DecodeFailure::Malformed("zTXt without compression method")),
                }
            }
            TextualKind::International => {
                let (k, v) = self.keyword_split(raw)?;
                (Some(k), self.itxt_body(v)?)
            }
            TextualKind::JpegComment => (None, Cow::Borrowed(trim_nul(raw))),
            TextualKind::GifComment => {
                let text = gif::deframe_sub_blocks(raw);
                (None, Cow::Owned(trim_nul(&text).to_vec()))
            }
        };
        let text = self.text_decode(&body);
        Ok((keyword, self.classify(text)))
    }
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Extract and classify the payload of one textual record.
///
/// Returns `None` for records that are not textual. Read and decode failures
/// degrade to a binary payload; nothing propagates.
pub fn extract<R: Read + Seek + ?Sized>(
    src: &mut R,
    record: &ChunkRecord,
    family: ContainerFamily,
    config: &PayloadConfig,
) -> Option<Extraction> {
    let kind = TextualKind::of(record, family, config)?;
    let tag = record.type_tag.to_string();
    let mut chain = Chain {
        config,
        offset: record.byte_offset,
        steps: Vec::new(),
        issues: Vec::new(),
    };

    let want = (record.length as u64).min(config.max_payload_bytes);
    if want < record.length as u64 {
        chain.issues.push(InspectIssue::at(
            IssueKind::PayloadCapped,
            record.byte_offset,
            format!("{}: read {} of {} bytes", tag, want, record.length),
        ));
    }
    let raw = match read_at(src, record.data_offset, want) {
        Ok(raw) => raw,
        Err(e) => {
            chain.issues.push(InspectIssue::at(
                IssueKind::UndecodablePayload,
                record.byte_offset,
                format!("{}: read failed: {}", tag, e),
            ));
            Vec::new()
        }
    };

    let (keyword, content) = match chain.run(kind, &raw) {
        Ok(decoded) => decoded,
        Err(failure) => {
            trace!(?failure, %tag, "decode chain fell back to binary");
            chain.issues.push(failure.issue(record.byte_offset, &tag));
            chain.step(DecodeStep::BinaryFallback);
            let keyword = kind
                .has_keyword()
                .then(|| memchr::memchr(0, &raw).filter(|&n| n > 0))
                .flatten()
                .map(|n| encoding_rs::mem::decode_latin1(&raw[..n]).into_owned());
            (
                keyword,
                PayloadContent::Binary {
                    entropy: shannon_entropy(&raw),
                },
            )
        }
    };

    let is_workflow_candidate = content
        .as_json()
        .is_some_and(|v| payload_shape(keyword.as_deref(), v).is_some());
    let source_tag = match &keyword {
        Some(k) => format!("{}:{}", tag, k),
        None => tag,
    };
    debug!(
        source = %source_tag,
        classification = %content.classification(),
        workflow = is_workflow_candidate,
        "payload extracted"
    );

    Some(Extraction {
        payload: PayloadRecord {
            source_tag,
            keyword,
            byte_offset: record.byte_offset,
            byte_size: record.length,
            content,
            is_workflow_candidate,
            provenance: chain.steps,
        },
        issues: chain.issues,
    })
}

/// Extract every textual record of a structural report, in file order.
pub fn extract_all<R: Read + Seek + ?Sized>(
    src: &mut R,
    structure: &StructuralReport,
    config: &PayloadConfig,
) -> (Vec<PayloadRecord>, Vec<InspectIssue>) {
    let mut payloads = Vec::new();
    let mut issues = Vec::new();
    for record in &structure.records {
        if let Some(extraction) = extract(src, record, structure.format, config) {
            payloads.push(extraction.payload);
            issues.extend(extraction.issues);
        }
    }
    (payloads, issues)
}
