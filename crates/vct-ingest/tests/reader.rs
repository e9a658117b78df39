//! Tests for windowed CSV reading and schema sampling.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::{UTF_8, WINDOWS_1252};
use tempfile::TempDir;
use vct_ingest::{
    IngestError, SourceReader, default_encodings, infer_schema, list_csv_files, table_name_for,
};
use vct_model::ColumnType;

fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn windows_cover_every_row_once() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("id,value\n");
    for i in 0..2_345 {
        contents.push_str(&format!("{i},{}\n", i * 2));
    }
    let path = write(dir.path(), "big.csv", contents.as_bytes());

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    let windows: Vec<_> = reader
        .windows(1000)
        .expect("windows")
        .collect::<Result<_, _>>()
        .expect("read windows");

    let sizes: Vec<_> = windows.iter().map(|w| w.rows.len()).collect();
    assert_eq!(sizes, vec![1000, 1000, 345]);
    assert_eq!(windows[2].rows[344][0].as_deref(), Some("2344"));
}

#[test]
fn malformed_rows_are_skipped_and_counted() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "ragged.csv",
        b"a,b\n1,2\n3,4,5\n6\n7,8\n",
    );

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    let mut windows = reader.windows(10).expect("windows");
    let window = windows.next().expect("one window").expect("ok");
    assert!(windows.next().is_none());

    assert_eq!(window.skipped, 1);
    assert_eq!(window.rows.len(), 3);
    assert_eq!(window.rows[1], vec![Some("6".to_string()), None]);
}

#[test]
fn sample_is_bounded() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("kills\n");
    for i in 0..50 {
        contents.push_str(&format!("{i}\n"));
    }
    let path = write(dir.path(), "k.csv", contents.as_bytes());

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    let sample = reader.sample(10).expect("sample");
    assert_eq!(sample.headers, vec!["kills"]);
    assert_eq!(sample.rows.len(), 10);
}

#[test]
fn header_only_file_yields_no_windows() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "empty_rows.csv", b"a,b,c\n");

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    let sample = reader.sample(100).expect("sample");
    assert_eq!(sample.width(), 3);
    assert!(sample.is_empty());
    assert!(reader.windows(100).expect("windows").next().is_none());
}

#[test]
fn empty_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "nothing.csv", b"");

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    let result = reader.sample(10);
    assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
}

#[test]
fn latin1_file_reads_with_fallback_encoding() {
    let dir = TempDir::new().unwrap();
    let (bytes, _, _) = WINDOWS_1252.encode("team,region\nLeviatán,Americas\n");
    let path = write(dir.path(), "teams.csv", &bytes);

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    assert_eq!(reader.encoding(), WINDOWS_1252);
    let sample = reader.sample(10).expect("sample");
    assert_eq!(sample.rows[0][0].as_deref(), Some("Leviatán"));
}

#[test]
fn utf8_bom_is_stripped_from_first_header() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "bom.csv", "\u{feff}Match ID,Map\n1,Bind\n".as_bytes());

    let reader = SourceReader::open(&path, &default_encodings()).expect("open");
    assert_eq!(reader.encoding(), UTF_8);
    let sample = reader.sample(10).expect("sample");
    let schema = infer_schema("m", &sample).expect("schema");
    let names: Vec<_> = schema.column_names().collect();
    assert_eq!(names, vec!["match_id", "map"]);
}

#[test]
fn discovered_files_map_to_table_schemas() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "vct_2024/players_stats/players_stats.csv",
        b"Player,Team,Rating,Kills\naspas,LEV,1.21,230\nDemon1,EG,1.18,\n",
    );
    write(dir.path(), "all_ids/2023.csv", b"Team ID\n17\n");

    let files = list_csv_files(dir.path()).expect("list");
    assert_eq!(files.len(), 2);

    let names: Vec<_> = files
        .iter()
        .map(|f| table_name_for(f, dir.path()).expect("name"))
        .collect();
    assert_eq!(names, vec!["all_ids_2023", "vct_2024_players_stats_players_stats"]);

    let reader = SourceReader::open(&files[1], &default_encodings()).expect("open");
    let schema = infer_schema(&names[1], &reader.sample(1000).expect("sample")).expect("schema");
    let types: Vec<_> = schema.columns().iter().map(|c| c.column_type).collect();
    assert_eq!(
        types,
        vec![
            ColumnType::Text,
            ColumnType::Text,
            ColumnType::Real,
            ColumnType::Integer
        ]
    );
}
