//! Text encoding selection for source files.
//!
//! Exports from different tournament years are not consistently UTF-8. Each
//! file is probed against an ordered list of candidate encodings, and the first
//! one that decodes the complete file without a single malformed sequence is
//! used for every later read of that file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::{DecoderResult, Encoding, UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::error::{IngestError, Result};

const PROBE_BUFFER_BYTES: usize = 64 * 1024;

/// UTF-8 first, then Windows-1252.
///
/// Windows-1252 is the WHATWG decoder behind the `latin1`, `iso-8859-1`, and
/// `cp1252` labels.
pub fn default_encodings() -> Vec<&'static Encoding> {
    vec![UTF_8, WINDOWS_1252]
}

/// Resolves an encoding label such as `utf-8`, `latin1`, or `cp1252`.
///
/// Only ASCII-compatible encodings are accepted, since delimiters are located
/// on raw bytes.
pub fn parse_encoding_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).filter(|encoding| encoding.is_ascii_compatible())
}

/// Comma separated names of the given encodings.
pub fn encoding_names(encodings: &[&'static Encoding]) -> String {
    encodings
        .iter()
        .map(|encoding| encoding.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejects files carrying a UTF-16 byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::file_read(path, e))?;

    let mut buffer = [0u8; 2];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::file_read(path, e))?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Picks the first candidate that decodes the whole file.
pub fn detect_encoding(
    path: &Path,
    candidates: &[&'static Encoding],
) -> Result<&'static Encoding> {
    validate_encoding(path)?;
    for &encoding in candidates {
        if decodes_cleanly(path, encoding)? {
            debug!(path = %path.display(), encoding = encoding.name(), "encoding detected");
            return Ok(encoding);
        }
        debug!(
            path = %path.display(),
            encoding = encoding.name(),
            "encoding rejected"
        );
    }
    Err(IngestError::EncodingUndetected {
        path: path.to_path_buf(),
        tried: encoding_names(candidates),
    })
}

/// Streams the file through a strict decoder with a fixed-size buffer.
fn decodes_cleanly(path: &Path, encoding: &'static Encoding) -> Result<bool> {
    let mut file = File::open(path).map_err(|e| IngestError::file_read(path, e))?;
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut input = vec![0u8; PROBE_BUFFER_BYTES];
    let mut output = String::with_capacity(PROBE_BUFFER_BYTES * 3);

    loop {
        let read = file
            .read(&mut input)
            .map_err(|e| IngestError::file_read(path, e))?;
        let last = read == 0;
        let mut pending = &input[..read];
        loop {
            output.clear();
            let (result, consumed) =
                decoder.decode_to_string_without_replacement(pending, &mut output, last);
            pending = &pending[consumed..];
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(_, _) => return Ok(false),
            }
        }
        if last {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn encode_windows_1252(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    fn temp_bytes(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_utf8_file_detected_as_utf8() {
        let file = temp_bytes("player,team\nAspas,Leviatán\n".as_bytes());
        let encoding = detect_encoding(file.path(), &default_encodings()).unwrap();
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_latin1_file_falls_back() {
        let file = temp_bytes(&encode_windows_1252("player,team\nAspas,Leviatán\n"));
        let encoding = detect_encoding(file.path(), &default_encodings()).unwrap();
        assert_eq!(encoding, WINDOWS_1252);
    }

    #[test]
    fn test_no_candidate_matches() {
        let file = temp_bytes(&encode_windows_1252("player\nLeviatán\n"));
        let result = detect_encoding(file.path(), &[UTF_8]);
        assert!(matches!(
            result,
            Err(IngestError::EncodingUndetected { .. })
        ));
    }

    #[test]
    fn test_utf16_bom_rejected() {
        let file = temp_bytes(&[0xFF, 0xFE, b'a', 0x00]);
        let result = detect_encoding(file.path(), &default_encodings());
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }

    #[test]
    fn test_truncated_utf8_sequence_is_malformed() {
        let file = temp_bytes(&[b'a', b',', 0xE2, 0x82]);
        assert!(!decodes_cleanly(file.path(), UTF_8).unwrap());
    }

    #[test]
    fn test_multibyte_sequence_across_buffer_boundary() {
        let mut content = vec![b'x'; PROBE_BUFFER_BYTES - 1];
        content.extend_from_slice("é\n".as_bytes());
        let file = temp_bytes(&content);
        assert!(decodes_cleanly(file.path(), UTF_8).unwrap());
    }

    #[test]
    fn test_parse_encoding_label() {
        assert_eq!(parse_encoding_label("utf-8"), Some(UTF_8));
        assert_eq!(parse_encoding_label(" latin1 "), Some(WINDOWS_1252));
        assert_eq!(parse_encoding_label("cp1252"), Some(WINDOWS_1252));
        assert_eq!(parse_encoding_label("utf-16le"), None);
        assert_eq!(parse_encoding_label("klingon"), None);
    }

    #[test]
    fn test_missing_file() {
        let result = detect_encoding(Path::new("/nonexistent/overview.csv"), &default_encodings());
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
