//! Source file discovery under a data root.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{IngestError, Result};

/// Lists every CSV file below `dir`, recursing into subdirectories.
///
/// Returns files sorted by full path. Symlinked directories are not followed.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_csv_files(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_csv_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_csv_files(&path, files)?;
            continue;
        }
        if file_type.is_symlink() && path.is_dir() {
            trace!(path = %path.display(), "skipping symlinked directory");
            continue;
        }
        if !path.is_file() {
            continue;
        }

        if is_csv(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("vct_2024/matches")).unwrap();
        std::fs::create_dir_all(root.join("all_ids")).unwrap();

        for name in [
            "vct_2024/matches/overview.csv",
            "vct_2024/matches/scores.CSV",
            "all_ids/all_teams_ids.csv",
            "notes.txt",
        ] {
            std::fs::write(root.join(name), "header\ndata").unwrap();
        }
        dir
    }

    #[test]
    fn test_list_csv_files_recursive_and_sorted() {
        let dir = create_test_dir();
        let files = list_csv_files(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("all_ids/all_teams_ids.csv"),
                PathBuf::from("vct_2024/matches/overview.csv"),
                PathBuf::from("vct_2024/matches/scores.CSV"),
            ]
        );
    }

    #[test]
    fn test_list_csv_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        let files = list_csv_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_csv_files_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.csv");
        std::fs::write(&file_path, "data").unwrap();

        let result = list_csv_files(&file_path);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }
}
