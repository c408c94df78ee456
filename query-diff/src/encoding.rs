use crate::error::Result;
use chardetng::EncodingDetector as StatisticalDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs;
use std::path::Path;

/// How much of a file is searched for an XML declaration
const DECLARATION_WINDOW: usize = 1024;

/// Where an encoding decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// Byte order mark
    Bom,
    /// `encoding="..."` in the XML declaration, or its UTF-16 byte pattern
    Declaration,
    /// Content is valid UTF-8 (this includes plain ASCII)
    Utf8,
    /// chardetng guess
    Statistical,
    /// Nothing conclusive; the detector default was used
    Default,
}

/// Best-guess encoding of some bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,
    pub source: DetectionSource,
    /// Why detection fell back to the default, if it did
    pub fallback_reason: Option<String>,
}

impl DetectedEncoding {
    fn from(encoding: &'static Encoding, source: DetectionSource) -> Self {
        Self {
            encoding,
            source,
            fallback_reason: None,
        }
    }

    /// WHATWG name of the encoding, e.g. `Shift_JIS`
    pub fn label(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DetectionSource::Default
    }
}

/// Guesses the text encoding of captured responses.
///
/// Order: BOM, XML declaration, UTF-8 validity, statistical detection.
/// Inconclusive input resolves to the default encoding; only unreadable
/// files are errors.
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    default: &'static Encoding,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingDetector {
    pub fn new() -> Self {
        Self { default: UTF_8 }
    }

    pub fn with_default(default: &'static Encoding) -> Self {
        Self { default }
    }

    /// Detect the encoding of the file at `path`
    pub fn detect<P: AsRef<Path>>(&self, path: P) -> Result<DetectedEncoding> {
        let bytes = fs::read(path.as_ref())?;
        Ok(self.detect_bytes(&bytes))
    }

    pub fn detect_bytes(&self, bytes: &[u8]) -> DetectedEncoding {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return DetectedEncoding::from(encoding, DetectionSource::Bom);
        }

        let mut ambiguity = None;
        match declared_encoding(bytes) {
            Declared::Known(encoding) => {
                return DetectedEncoding::from(encoding, DetectionSource::Declaration)
            }
            Declared::Unknown(label) => {
                ambiguity = Some(format!("unknown declared encoding '{}'", label))
            }
            Declared::Absent => {}
        }

        if bytes.is_empty() {
            return self.fallback("empty content");
        }

        if std::str::from_utf8(bytes).is_ok() {
            return DetectedEncoding::from(UTF_8, DetectionSource::Utf8);
        }

        let mut detector = StatisticalDetector::new();
        detector.feed(bytes, true);
        let guess = detector.guess(None, true);
        if guess
            .decode_without_bom_handling_and_without_replacement(bytes)
            .is_some()
        {
            return DetectedEncoding::from(guess, DetectionSource::Statistical);
        }

        let reason = match ambiguity {
            Some(declared) => format!("{}; guess {} does not decode cleanly", declared, guess.name()),
            None => format!("guess {} does not decode cleanly", guess.name()),
        };
        self.fallback(&reason)
    }

    fn fallback(&self, reason: &str) -> DetectedEncoding {
        DetectedEncoding {
            encoding: self.default,
            source: DetectionSource::Default,
            fallback_reason: Some(reason.to_string()),
        }
    }
}

enum Declared<'a> {
    Known(&'static Encoding),
    Unknown(&'a str),
    Absent,
}

fn declared_encoding(bytes: &[u8]) -> Declared<'_> {
    // BOM-less UTF-16 signatures of "<?"
    if bytes.starts_with(&[0x3C, 0x00, 0x3F, 0x00]) {
        return Declared::Known(UTF_16LE);
    }
    if bytes.starts_with(&[0x00, 0x3C, 0x00, 0x3F]) {
        return Declared::Known(UTF_16BE);
    }

    if !bytes.starts_with(b"<?xml") {
        return Declared::Absent;
    }

    let window = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    let Some(end) = find(window, b"?>") else {
        return Declared::Absent;
    };
    let declaration = &window[..end];

    let Some(position) = find(declaration, b"encoding") else {
        return Declared::Absent;
    };
    let rest = &declaration[position + b"encoding".len()..];
    let rest = trim_ascii_start(rest);
    let Some(rest) = rest.strip_prefix(b"=") else {
        return Declared::Absent;
    };
    let rest = trim_ascii_start(rest);
    let Some((&quote, rest)) = rest.split_first() else {
        return Declared::Absent;
    };
    if quote != b'"' && quote != b'\'' {
        return Declared::Absent;
    }
    let Some(close) = rest.iter().position(|&b| b == quote) else {
        return Declared::Absent;
    };

    let label = &rest[..close];
    let Ok(label_str) = std::str::from_utf8(label) else {
        return Declared::Absent;
    };

    match Encoding::for_label(label) {
        // an ASCII-readable declaration cannot be UTF-16 content
        Some(encoding) if encoding == UTF_16LE || encoding == UTF_16BE => Declared::Unknown(label_str),
        Some(encoding) => Declared::Known(encoding),
        None => Declared::Unknown(label_str),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, WINDOWS_1252};
    use tempfile::TempDir;

    #[test]
    fn test_bom_wins() {
        let detector = EncodingDetector::new();

        let utf8 = detector.detect_bytes(b"\xEF\xBB\xBF<a/>");
        assert_eq!(utf8.encoding, UTF_8);
        assert_eq!(utf8.source, DetectionSource::Bom);

        let utf16 = detector.detect_bytes(b"\xFF\xFE<\x00a\x00/\x00>\x00");
        assert_eq!(utf16.encoding, UTF_16LE);
        assert_eq!(utf16.source, DetectionSource::Bom);
    }

    #[test]
    fn test_xml_declaration() {
        let (body, _, _) = SHIFT_JIS.encode("<?xml version=\"1.0\" encoding=\"Shift_JIS\"?><a>日本語</a>");
        let detected = EncodingDetector::new().detect_bytes(&body);

        assert_eq!(detected.encoding, SHIFT_JIS);
        assert_eq!(detected.source, DetectionSource::Declaration);
        assert_eq!(detected.label(), "Shift_JIS");
    }

    #[test]
    fn test_single_quoted_declaration_with_spaces() {
        let detected = EncodingDetector::new()
            .detect_bytes(b"<?xml version='1.0' encoding = 'iso-8859-1' ?><a/>");
        assert_eq!(detected.encoding, WINDOWS_1252);
        assert_eq!(detected.source, DetectionSource::Declaration);
    }

    #[test]
    fn test_bomless_utf16_signature() {
        let detected = EncodingDetector::new().detect_bytes(b"<\x00?\x00x\x00m\x00l\x00");
        assert_eq!(detected.encoding, UTF_16LE);
        assert_eq!(detected.source, DetectionSource::Declaration);
    }

    #[test]
    fn test_valid_utf8_without_declaration() {
        let detected = EncodingDetector::new().detect_bytes("<a>héllo</a>".as_bytes());
        assert_eq!(detected.encoding, UTF_8);
        assert_eq!(detected.source, DetectionSource::Utf8);
        assert!(!detected.is_fallback());
    }

    #[test]
    fn test_unknown_declared_label_with_ascii_content() {
        let detected = EncodingDetector::new()
            .detect_bytes(b"<?xml version=\"1.0\" encoding=\"x-made-up\"?><a/>");
        assert_eq!(detected.encoding, UTF_8);
        assert_eq!(detected.source, DetectionSource::Utf8);
    }

    #[test]
    fn test_statistical_guess_for_legacy_bytes() {
        let detected = EncodingDetector::new()
            .detect_bytes(b"<a>caf\xE9 cr\xE8me br\xFBl\xE9e, tr\xE8s \xE9l\xE9gant</a>");
        assert_eq!(detected.source, DetectionSource::Statistical);
        assert_ne!(detected.encoding, UTF_8);
    }

    #[test]
    fn test_empty_content_falls_back_to_default() {
        let detected = EncodingDetector::with_default(WINDOWS_1252).detect_bytes(b"");
        assert_eq!(detected.encoding, WINDOWS_1252);
        assert!(detected.is_fallback());
        assert_eq!(detected.fallback_reason.as_deref(), Some("empty content"));
    }

    #[test]
    fn test_detect_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resp_1.xml");
        fs::write(&path, "<a/>").unwrap();

        let detected = EncodingDetector::new().detect(&path).unwrap();
        assert_eq!(detected.encoding, UTF_8);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = EncodingDetector::new().detect(temp_dir.path().join("missing.xml"));
        assert!(result.is_err());
    }
}
