//! Column type inference over sampled values.

use vct_model::ColumnType;

/// Maximum number of non-blank values inspected per column.
pub const INFERENCE_SAMPLE_LIMIT: usize = 100;

/// Infers a storage type from a column's sampled values.
///
/// Blank values are ignored and only the first [`INFERENCE_SAMPLE_LIMIT`]
/// non-blank values are looked at. Every inspected value must parse as an
/// integer for [`ColumnType::Integer`], or as a float for
/// [`ColumnType::Real`]; anything else (including an all-blank column) is
/// [`ColumnType::Text`].
///
/// ```
/// use vct_ingest::infer_column_type;
/// use vct_model::ColumnType;
///
/// assert_eq!(infer_column_type(["1", "2", "3"]), ColumnType::Integer);
/// assert_eq!(infer_column_type(["1", "2.5"]), ColumnType::Real);
/// assert_eq!(infer_column_type(["1", "abc"]), ColumnType::Text);
/// ```
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut inspected = 0usize;
    let mut all_integers = true;
    let mut all_reals = true;

    for value in values
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .take(INFERENCE_SAMPLE_LIMIT)
    {
        inspected += 1;
        if all_integers && value.parse::<i64>().is_err() {
            all_integers = false;
        }
        if all_reals && value.parse::<f64>().is_err() {
            all_reals = false;
        }
        if !all_integers && !all_reals {
            break;
        }
    }

    if inspected == 0 {
        ColumnType::Text
    } else if all_integers {
        ColumnType::Integer
    } else if all_reals {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}
