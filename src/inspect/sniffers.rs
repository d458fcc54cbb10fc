//! Container and MIME sniffers for initial classification.
//!
//! [`identify`] matches the leading byte window against a fixed table of image
//! signatures. The MIME hint uses `infer` for content-based detection and
//! `mime_guess` for extension-based hints, with conflict detection.

use crate::core::inspect::{
    Confidence, ContainerDescriptor, ContainerFamily, InspectIssue, IssueKind,
};
use std::path::Path;
use tracing::debug;

/// Number of leading bytes retained in [`ContainerDescriptor::magic_prefix`].
pub const MAGIC_PREFIX_LEN: usize = 16;

/// Byte pattern with optional wildcard positions (`None`).
struct Signature {
    family: ContainerFamily,
    pattern: &'static [Option<u8>],
}

// `_` marks a wildcard byte.
macro_rules! sig {
    (@one _) => { None };
    (@one $b:expr) => { Some($b) };
    ($($b:tt),* $(,)?) => { &[$(sig!(@one $b)),*] };
}

// Ordered: first match wins.
const SIGNATURES: &[Signature] = &[
    Signature {
        family: ContainerFamily::Png,
        pattern: sig![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'],
    },
    Signature {
        family: ContainerFamily::Jpeg,
        pattern: sig![0xFF, 0xD8, 0xFF],
    },
    Signature {
        family: ContainerFamily::Gif,
        pattern: sig![b'G', b'I', b'F', b'8', b'7', b'a'],
    },
    Signature {
        family: ContainerFamily::Gif,
        pattern: sig![b'G', b'I', b'F', b'8', b'9', b'a'],
    },
    Signature {
        family: ContainerFamily::Bmp,
        pattern: sig![b'B', b'M'],
    },
    Signature {
        family: ContainerFamily::Webp,
        pattern: sig![b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P'],
    },
];

impl Signature {
    fn matches_full(&self, data: &[u8]) -> bool {
        data.len() >= self.pattern.len()
            && self
                .pattern
                .iter()
                .zip(data)
                .all(|(p, b)| p.map_or(true, |p| p == *b))
    }

    /// The window is shorter than the pattern but agrees with it so far.
    fn matches_partial(&self, data: &[u8]) -> bool {
        data.len() < self.pattern.len()
            && self
                .pattern
                .iter()
                .zip(data)
                .all(|(p, b)| p.map_or(true, |p| p == *b))
    }
}

/// Identify the container family from the leading bytes of a file.
///
/// Never fails: an unrecognised window yields `UNKNOWN`/`low`.
pub fn identify(leading: &[u8]) -> ContainerDescriptor {
    let prefix = leading[..leading.len().min(MAGIC_PREFIX_LEN)].to_vec();

    if let Some(sig) = SIGNATURES.iter().find(|s| s.matches_full(leading)) {
        let confidence = match sig.family {
            ContainerFamily::Bmp if !bmp_header_plausible(leading) => Confidence::Medium,
            _ => Confidence::High,
        };
        debug!(family = %sig.family, %confidence, "container signature matched");
        return ContainerDescriptor::new(sig.family, confidence, prefix);
    }

    if leading.len() >= 2 {
        let mut families: Vec<ContainerFamily> = SIGNATURES
            .iter()
            .filter(|s| s.matches_partial(leading))
            .map(|s| s.family)
            .collect();
        families.dedup();
        if let [family] = families.as_slice() {
            debug!(family = %family, window = leading.len(), "partial container signature");
            return ContainerDescriptor::new(*family, Confidence::Medium, prefix);
        }
    }

    debug!("no container signature in {} leading bytes", leading.len());
    ContainerDescriptor::new(ContainerFamily::Unknown, Confidence::Low, prefix)
}

/// `bfOffBits` must point past the smallest headers and inside the declared file.
fn bmp_header_plausible(data: &[u8]) -> bool {
    if data.len() < 14 {
        return false;
    }
    let declared_size = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
    let pixel_offset = u32::from_le_bytes([data[10], data[11], data[12], data[13]]);
    pixel_offset >= 26 && pixel_offset < declared_size
}

/// Sniffer for content-based MIME detection using `infer`.
pub struct ContentSniffer;

impl ContentSniffer {
    pub fn sniff_bytes(data: &[u8]) -> Option<String> {
        let kind = infer::get(data)?;
        debug!(
            "Content detected as {} ({})",
            kind.mime_type(),
            kind.extension()
        );
        Some(kind.mime_type().to_string())
    }
}

/// Sniffer for extension-based MIME detection using `mime_guess`.
pub struct ExtensionSniffer;

impl ExtensionSniffer {
    /// Guess from the file name's extension. Returns `(mime, extension)`.
    pub fn sniff_name(name: &str) -> Option<(String, String)> {
        let ext = Path::new(name).extension()?.to_str()?;
        let mime = mime_guess::from_ext(ext).first()?;
        Some((mime.to_string(), ext.to_string()))
    }
}

/// MIME hint for the intake summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnifferResult {
    pub mime_hint: String,
    pub issues: Vec<InspectIssue>,
}

/// Combined sniffer: content first, extension second, conflicts reported.
pub struct CombinedSniffer;

impl CombinedSniffer {
    pub fn sniff(data: &[u8], file_name: Option<&str>) -> SnifferResult {
        let content = ContentSniffer::sniff_bytes(data);
        let extension = file_name.and_then(ExtensionSniffer::sniff_name);
        let mut issues = Vec::new();

        if let (Some(content_mime), Some((ext_mime, ext))) = (&content, &extension) {
            if !Self::same_type(content_mime, ext_mime) {
                issues.push(InspectIssue::new(
                    IssueKind::MimeMismatch,
                    None,
                    format!(
                        "content suggests {} but extension .{} suggests {}",
                        content_mime, ext, ext_mime
                    ),
                ));
            }
        }

        let mime_hint = content
            .or(extension.map(|(mime, _)| mime))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        SnifferResult { mime_hint, issues }
    }

    fn same_type(a: &str, b: &str) -> bool {
        fn canon(m: &str) -> &str {
            match m {
                "image/jpg" | "image/pjpeg" => "image/jpeg",
                "image/x-ms-bmp" | "image/x-bmp" => "image/bmp",
                "image/x-png" => "image/png",
                other => other,
            }
        }
        canon(a).eq_ignore_ascii_case(canon(b))
    }
}
