//! Decoding of raw CSV records into rows.

use csv::ByteRecord;
use encoding_rs::Encoding;

/// One data row; `None` marks an empty field.
pub type Row = Vec<Option<String>>;

/// Decodes a header record, stripping a leading byte order mark.
pub(crate) fn decode_headers(record: &ByteRecord, encoding: &'static Encoding) -> Option<Vec<String>> {
    let mut headers = Vec::with_capacity(record.len());
    for (idx, field) in record.iter().enumerate() {
        let text = encoding.decode_without_bom_handling_and_without_replacement(field)?;
        let text: &str = if idx == 0 {
            text.trim_start_matches('\u{feff}')
        } else {
            &text
        };
        headers.push(text.trim().to_string());
    }
    Some(headers)
}

/// Decodes a data record to `width` fields.
///
/// Returns `None` for a malformed record: more fields than the header or a
/// field the encoding cannot decode. Short records are padded with `None`.
pub(crate) fn decode_row(
    record: &ByteRecord,
    width: usize,
    encoding: &'static Encoding,
) -> Option<Row> {
    if record.len() > width {
        return None;
    }
    let mut row = Vec::with_capacity(width);
    for field in record.iter() {
        let text = encoding.decode_without_bom_handling_and_without_replacement(field)?;
        if text.is_empty() {
            row.push(None);
        } else {
            row.push(Some(text.into_owned()));
        }
    }
    row.resize(width, None);
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn test_decode_row_pads_short_records() {
        let record = ByteRecord::from(vec!["1", ""]);
        let row = decode_row(&record, 3, UTF_8).unwrap();
        assert_eq!(row, vec![Some("1".to_string()), None, None]);
    }

    #[test]
    fn test_decode_row_rejects_long_records() {
        let record = ByteRecord::from(vec!["1", "2", "3"]);
        assert!(decode_row(&record, 2, UTF_8).is_none());
    }

    #[test]
    fn test_decode_row_rejects_undecodable_field() {
        let mut record = ByteRecord::new();
        record.push_field(b"ok");
        record.push_field(&[0xE1, b'n']);
        assert!(decode_row(&record, 2, UTF_8).is_none());
        let row = decode_row(&record, 2, WINDOWS_1252).unwrap();
        assert_eq!(row[1].as_deref(), Some("\u{e1}n"));
    }

    #[test]
    fn test_decode_headers_strips_bom() {
        let record = ByteRecord::from(vec!["\u{feff}Team", " Player "]);
        let headers = decode_headers(&record, UTF_8).unwrap();
        assert_eq!(headers, vec!["Team", "Player"]);
    }
}
