//! CSV file reading with a fixed encoding and bounded row windows.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Reader, ReaderBuilder};
use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::encoding::detect_encoding;
use crate::error::{IngestError, Result};

use super::row::{Row, decode_headers, decode_row};

/// Header plus a bounded prefix of data rows used for schema inference.
#[derive(Debug, Clone)]
pub struct CsvSample {
    /// Raw header names (trimmed, BOM removed).
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Malformed rows dropped while reading the sample.
    pub skipped_rows: usize,
}

impl CsvSample {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-empty values of one column, in row order.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(idx).and_then(|value| value.as_deref()))
    }
}

/// A batch of rows read in one step.
#[derive(Debug, Clone, Default)]
pub struct RowWindow {
    pub rows: Vec<Row>,
    /// Malformed rows dropped while filling this window.
    pub skipped: usize,
}

/// A source file paired with the encoding chosen for it.
#[derive(Debug, Clone)]
pub struct SourceReader {
    path: PathBuf,
    encoding: &'static Encoding,
}

impl SourceReader {
    /// Opens a source, probing `candidates` in order for a clean decode.
    pub fn open(path: &Path, candidates: &[&'static Encoding]) -> Result<Self> {
        let encoding = detect_encoding(path, candidates)?;
        Ok(Self::with_encoding(path, encoding))
    }

    /// Uses a known encoding without probing.
    pub fn with_encoding(path: &Path, encoding: &'static Encoding) -> Self {
        Self {
            path: path.to_path_buf(),
            encoding,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Reads the header and at most `max_rows` data rows.
    pub fn sample(&self, max_rows: usize) -> Result<CsvSample> {
        let mut windows = self.windows(max_rows)?;
        let headers = windows.headers().to_vec();
        let window = match windows.next() {
            Some(window) => window?,
            None => RowWindow::default(),
        };
        Ok(CsvSample {
            headers,
            rows: window.rows,
            skipped_rows: window.skipped,
        })
    }

    /// Opens a fresh pass over the data rows in windows of `window_size`.
    pub fn windows(&self, window_size: usize) -> Result<RowWindows> {
        let file = File::open(&self.path).map_err(|e| IngestError::file_read(&self.path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header_record = reader
            .byte_headers()
            .map_err(|e| IngestError::csv(&self.path, &e))?
            .clone();
        if header_record.is_empty() {
            return Err(IngestError::EmptyCsv {
                path: self.path.clone(),
            });
        }
        let headers = decode_headers(&header_record, self.encoding).ok_or_else(|| {
            IngestError::EncodingUndetected {
                path: self.path.clone(),
                tried: self.encoding.name().to_string(),
            }
        })?;

        Ok(RowWindows {
            reader,
            path: self.path.clone(),
            encoding: self.encoding,
            headers,
            window_size: window_size.max(1),
            record: ByteRecord::new(),
            done: false,
        })
    }
}

/// Iterator over consecutive [`RowWindow`]s of a source file.
///
/// Holds at most one window of decoded rows at a time.
pub struct RowWindows {
    reader: Reader<File>,
    path: PathBuf,
    encoding: &'static Encoding,
    headers: Vec<String>,
    window_size: usize,
    record: ByteRecord,
    done: bool,
}

impl RowWindows {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn width(&self) -> usize {
        self.headers.len()
    }
}

impl Iterator for RowWindows {
    type Item = Result<RowWindow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut window = RowWindow {
            rows: Vec::with_capacity(self.window_size),
            skipped: 0,
        };
        while window.rows.len() < self.window_size {
            match self.reader.read_byte_record(&mut self.record) {
                Ok(true) => match decode_row(&self.record, self.width(), self.encoding) {
                    Some(row) => window.rows.push(row),
                    None => {
                        window.skipped += 1;
                        debug!(
                            path = %self.path.display(),
                            line = self.record.position().map(|p| p.line()),
                            fields = self.record.len(),
                            expected = self.width(),
                            "dropping malformed row"
                        );
                    }
                },
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(err) => {
                    self.done = true;
                    warn!(path = %self.path.display(), error = %err, "CSV read failed");
                    return Some(Err(IngestError::csv(&self.path, &err)));
                }
            }
        }
        if self.done && window.rows.is_empty() && window.skipped == 0 {
            return None;
        }
        Some(Ok(window))
    }
}
