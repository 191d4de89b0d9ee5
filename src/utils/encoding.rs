//! Encoding detection and lenient text decoding.
//!
//! Reads never fail because of encoding problems:
//! - BOM markers (UTF-8, UTF-16 LE/BE) decide first
//! - a sample that is valid UTF-8, or mostly so, is decoded as UTF-8
//! - anything else is guessed with chardetng
//! - undecodable sequences become U+FFFD

use chardetng::EncodingDetector;
use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Pick the encoding for a leading byte sample.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(sample) {
        return encoding;
    }

    let (multi_byte, invalid) = utf8_profile(sample);
    if invalid == 0 || (multi_byte > 0 && multi_byte >= invalid) {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);
    detector.guess(None, true)
}

/// Count valid multi-byte UTF-8 characters and invalid bytes in `bytes`.
/// A sequence cut off at the end of the sample is not counted as invalid.
fn utf8_profile(mut bytes: &[u8]) -> (usize, usize) {
    let non_ascii = |text: &str| text.chars().filter(|c| !c.is_ascii()).count();
    let mut multi_byte = 0;
    let mut invalid = 0;
    loop {
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                multi_byte += non_ascii(text);
                return (multi_byte, invalid);
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                multi_byte += std::str::from_utf8(valid).map_or(0, non_ascii);
                match e.error_len() {
                    Some(len) => {
                        invalid += len;
                        bytes = &rest[len..];
                    }
                    None => return (multi_byte, invalid),
                }
            }
        }
    }
}

/// Incremental decoder turning byte chunks into UTF-8 text.
pub struct TextDecoder {
    decoder: Decoder,
}

impl TextDecoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { decoder: encoding.new_decoder_with_bom_removal() }
    }

    /// Decoder for a stream whose first chunk is `sample`.
    pub fn for_sample(sample: &[u8]) -> Self {
        Self::new(detect_encoding(sample))
    }

    /// Append the decoding of `src` to `dst`. Pass `last = true` with the
    /// final chunk (possibly empty) to flush a trailing partial sequence.
    pub fn decode(&mut self, mut src: &[u8], dst: &mut String, last: bool) {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or_else(|| src.len().saturating_mul(3).saturating_add(16));
            dst.reserve(needed);

            let (result, read, _had_errors) = self.decoder.decode_to_string(src, dst, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }
}

/// Read a whole file as text, detecting its encoding from the first bytes.
pub fn read_text_lossy(path: &Path) -> io::Result<String> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    let mut decoder = TextDecoder::for_sample(sample);
    let mut text = String::new();
    decoder.decode(&bytes, &mut text, true);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_utf8() {
        assert_eq!(detect_encoding("Hello, world! 🚀".as_bytes()), UTF_8);
    }

    #[test]
    fn test_detect_utf8_cut_mid_character() {
        let bytes = "é".as_bytes();
        assert_eq!(detect_encoding(&bytes[..1]), UTF_8);
    }

    #[test]
    fn test_detect_mostly_utf8_with_stray_byte() {
        let mut bytes = "café naïve résumé\n".repeat(3).into_bytes();
        bytes.extend_from_slice(b"tail \xff end\n");
        assert_eq!(detect_encoding(&bytes), UTF_8);
    }

    #[test]
    fn test_detect_legacy_single_byte_text() {
        assert_ne!(detect_encoding(b"caf\xe9 na\xefve r\xe9sum\xe9\n"), UTF_8);
    }

    #[test]
    fn test_detect_utf16_bom() {
        assert_eq!(detect_encoding(&[0xff, 0xfe, b'h', 0x00]), encoding_rs::UTF_16LE);
        assert_eq!(detect_encoding(&[0xfe, 0xff, 0x00, b'h']), encoding_rs::UTF_16BE);
    }

    #[test]
    fn test_decoder_strips_utf8_bom() {
        let mut decoder = TextDecoder::for_sample(&[0xef, 0xbb, 0xbf, b'h']);
        let mut out = String::new();
        decoder.decode(&[0xef, 0xbb, 0xbf, b'h', b'i'], &mut out, true);
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_decoder_handles_split_multibyte_sequences() {
        let bytes = "aé".as_bytes();
        let mut decoder = TextDecoder::new(UTF_8);
        let mut out = String::new();
        decoder.decode(&bytes[..2], &mut out, false);
        decoder.decode(&bytes[2..], &mut out, true);
        assert_eq!(out, "aé");
    }

    #[test]
    fn test_read_text_lossy_never_fails_on_bad_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ok line\n\xff\xfe\xfd tail").unwrap();
        file.flush().unwrap();

        let text = read_text_lossy(file.path()).unwrap();
        assert!(text.starts_with("ok line\n"));
        assert!(text.ends_with(" tail"));
    }

    #[test]
    fn test_read_text_lossy_decodes_utf16() {
        let mut file = NamedTempFile::new().unwrap();
        let mut bytes = vec![0xff, 0xfe];
        for unit in "helper(x)".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        assert_eq!(read_text_lossy(file.path()).unwrap(), "helper(x)");
    }
}
