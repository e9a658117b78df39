//! Encoding-aware CSV reading in bounded windows.

mod reader;
mod row;

pub use reader::{CsvSample, RowWindow, RowWindows, SourceReader};
pub use row::Row;
