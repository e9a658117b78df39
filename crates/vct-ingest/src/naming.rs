//! Storage-safe identifiers for columns and tables.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};

use crate::error::{IngestError, Result};

/// Placeholder for a header that sanitizes to nothing.
pub const EMPTY_COLUMN_NAME: &str = "unnamed_column";

/// Placeholder for a path that sanitizes to nothing.
pub const EMPTY_TABLE_NAME: &str = "unnamed_table";

const DIGIT_COLUMN_PREFIX: &str = "col_";
const DIGIT_TABLE_PREFIX: &str = "t_";

/// Replaces everything outside `[A-Za-z0-9_]` with `_`, collapses `_` runs,
/// and trims `_` from both ends.
fn clean_chars(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut last_was_underscore = false;
    for ch in raw.trim().chars() {
        let ch = if ch.is_ascii_alphanumeric() { ch } else { '_' };
        if ch == '_' {
            if !last_was_underscore {
                cleaned.push('_');
            }
            last_was_underscore = true;
        } else {
            cleaned.push(ch);
            last_was_underscore = false;
        }
    }
    cleaned.trim_matches('_').to_string()
}

fn starts_with_digit(value: &str) -> bool {
    value.chars().next().is_some_and(|ch| ch.is_ascii_digit())
}

/// Maps arbitrary header text to a storage-safe column identifier.
///
/// ```
/// use vct_ingest::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Match ID!"), "match_id");
/// assert_eq!(sanitize_identifier("2nd Half"), "col_2nd_half");
/// assert_eq!(sanitize_identifier(""), "unnamed_column");
/// ```
pub fn sanitize_identifier(raw: &str) -> String {
    let mut cleaned = clean_chars(raw);
    if starts_with_digit(&cleaned) {
        cleaned.insert_str(0, DIGIT_COLUMN_PREFIX);
    }
    if cleaned.is_empty() {
        return EMPTY_COLUMN_NAME.to_string();
    }
    cleaned.to_ascii_lowercase()
}

/// Makes a list of names unique.
///
/// The first occurrence keeps its name; repeats get `_1`, `_2`, ... in
/// first-seen order. A suffixed candidate that is already taken keeps counting
/// up, so the result never contains duplicates.
pub fn dedupe_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut used: BTreeSet<String> = BTreeSet::new();
    let mut counters: BTreeMap<&str, usize> = BTreeMap::new();
    let mut result = Vec::with_capacity(names.len());
    for name in names {
        let base = name.as_ref();
        let mut candidate = base.to_string();
        if used.contains(&candidate) {
            let counter = counters.entry(base).or_insert(0);
            loop {
                *counter += 1;
                candidate = format!("{base}_{counter}");
                if !used.contains(&candidate) {
                    break;
                }
            }
        }
        used.insert(candidate.clone());
        result.push(candidate);
    }
    result
}

/// Sanitizes every header and resolves collisions.
pub fn sanitize_column_names<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let sanitized: Vec<String> = headers
        .iter()
        .map(|header| sanitize_identifier(header.as_ref()))
        .collect();
    dedupe_names(&sanitized)
}

/// Derives the destination table name from a file's location under `root`.
///
/// Directory segments and the file stem are joined with `_` and cleaned with
/// the column rules.
///
/// ```
/// use std::path::Path;
/// use vct_ingest::table_name_for;
///
/// let name = table_name_for(
///     Path::new("data/vct_2024/matches/overview.csv"),
///     Path::new("data"),
/// )
/// .unwrap();
/// assert_eq!(name, "vct_2024_matches_overview");
/// ```
pub fn table_name_for(source: &Path, root: &Path) -> Result<String> {
    let relative = source
        .strip_prefix(root)
        .map_err(|_| IngestError::OutsideRoot {
            path: source.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut segments: Vec<String> = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            if let Component::Normal(part) = component {
                segments.push(part.to_string_lossy().into_owned());
            }
        }
    }
    if let Some(stem) = relative.file_stem() {
        segments.push(stem.to_string_lossy().into_owned());
    }

    let mut name = clean_chars(&segments.join("_")).to_ascii_lowercase();
    if starts_with_digit(&name) {
        name.insert_str(0, DIGIT_TABLE_PREFIX);
    }
    if name.is_empty() {
        name = EMPTY_TABLE_NAME.to_string();
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vct_model::is_valid_identifier;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Match ID!"), "match_id");
        assert_eq!(sanitize_identifier("2nd Half"), "col_2nd_half");
        assert_eq!(sanitize_identifier(""), "unnamed_column");
        assert_eq!(sanitize_identifier("   "), "unnamed_column");
        assert_eq!(sanitize_identifier("!!!"), "unnamed_column");
        assert_eq!(sanitize_identifier("__Team__Name__"), "team_name");
        assert_eq!(sanitize_identifier("Kills / Deaths"), "kills_deaths");
        assert_eq!(sanitize_identifier("Rating 2.0"), "rating_2_0");
        assert_eq!(sanitize_identifier("Clutch Success %"), "clutch_success");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize_identifier("Équipe"), "quipe");
        assert_eq!(sanitize_identifier("Agent Ω"), "agent");
    }

    #[test]
    fn test_dedupe_names() {
        assert_eq!(dedupe_names(&["team", "team"]), vec!["team", "team_1"]);
        assert_eq!(
            dedupe_names(&["a", "b", "a", "a", "b"]),
            vec!["a", "b", "a_1", "a_2", "b_1"]
        );
    }

    #[test]
    fn test_dedupe_names_suffix_collision() {
        assert_eq!(dedupe_names(&["a", "a_1", "a"]), vec!["a", "a_1", "a_2"]);
        assert_eq!(dedupe_names(&["a", "a", "a_1"]), vec!["a", "a_1", "a_1_1"]);
    }

    #[test]
    fn test_sanitize_column_names() {
        assert_eq!(sanitize_column_names(&["Team", "Team"]), vec!["team", "team_1"]);
        assert_eq!(
            sanitize_column_names(&["", " ", "Player"]),
            vec!["unnamed_column", "unnamed_column_1", "player"]
        );
    }

    #[test]
    fn test_table_name_for_nested() {
        let name = table_name_for(
            Path::new("root/vct_2024/matches/overview.csv"),
            Path::new("root"),
        )
        .unwrap();
        assert_eq!(name, "vct_2024_matches_overview");
    }

    #[test]
    fn test_table_name_for_top_level_and_odd_chars() {
        assert_eq!(
            table_name_for(Path::new("root/Players Stats.csv"), Path::new("root")).unwrap(),
            "players_stats"
        );
        assert_eq!(
            table_name_for(Path::new("root/all-ids/Teams (IDs).CSV"), Path::new("root")).unwrap(),
            "all_ids_teams_ids"
        );
    }

    #[test]
    fn test_table_name_for_guards() {
        assert_eq!(
            table_name_for(Path::new("root/2021/kills.csv"), Path::new("root")).unwrap(),
            "t_2021_kills"
        );
        assert_eq!(
            table_name_for(Path::new("root/___.csv"), Path::new("root")).unwrap(),
            "unnamed_table"
        );
    }

    #[test]
    fn test_table_name_for_outside_root() {
        let result = table_name_for(Path::new("elsewhere/a.csv"), Path::new("root"));
        assert!(matches!(result, Err(IngestError::OutsideRoot { .. })));
    }

    proptest! {
        #[test]
        fn sanitized_names_are_valid_identifiers(raw in ".{0,40}") {
            let name = sanitize_identifier(&raw);
            prop_assert!(is_valid_identifier(&name), "invalid: {name:?}");
            prop_assert_eq!(sanitize_identifier(&raw), name);
        }

        #[test]
        fn sanitized_headers_are_unique(raw in proptest::collection::vec("[A-Za-z _1]{0,4}", 0..16)) {
            let names = sanitize_column_names(&raw);
            let unique: BTreeSet<&String> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());
            prop_assert_eq!(names.len(), raw.len());
        }
    }
}
