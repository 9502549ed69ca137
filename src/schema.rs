//! Column type inference over a merged dataset
//!
//! Classification is total and runs once over each fully merged column, so a
//! single non-numeric shard forces the whole column to `Text`. No
//! nullability, precision, or key inference is performed.

use crate::merge::MergedDataset;
use std::fmt;

/// Relational type assigned to one merged column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// SQL type name used in generated DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// Infer one [`ColumnType`] per column of the merged dataset
pub fn infer_column_types(dataset: &MergedDataset) -> Vec<ColumnType> {
    (0..dataset.column_count())
        .map(|index| classify_column(dataset.column_values(index)))
        .collect()
}

/// Classify a single column from its merged cell values
///
/// `Integer` requires every cell present and parseable as i64. A numeric
/// column with missing cells (or an all-NULL column) classifies as `Real`,
/// matching how missing values promote integer columns to floating point in
/// the source datasets this loader was built against.
pub fn classify_column<'a, I>(values: I) -> ColumnType
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut all_integer = true;
    let mut has_null = false;
    let mut seen_value = false;

    for cell in values {
        match cell {
            None => has_null = true,
            Some(raw) => {
                seen_value = true;
                let trimmed = raw.trim();
                if trimmed.parse::<i64>().is_ok() {
                    continue;
                }
                if trimmed.parse::<f64>().is_ok() {
                    all_integer = false;
                } else {
                    return ColumnType::Text;
                }
            }
        }
    }

    if !seen_value {
        return ColumnType::Real;
    }
    if all_integer && !has_null {
        ColumnType::Integer
    } else {
        ColumnType::Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(cells: &[Option<&str>]) -> ColumnType {
        classify_column(cells.iter().copied())
    }

    #[test]
    fn test_all_integers_infer_integer() {
        assert_eq!(
            classify(&[Some("1"), Some("-42"), Some("0")]),
            ColumnType::Integer
        );
    }

    #[test]
    fn test_all_floats_infer_real() {
        assert_eq!(
            classify(&[Some("1.5"), Some("2.0"), Some("-0.25")]),
            ColumnType::Real
        );
    }

    #[test]
    fn test_mixed_integers_and_floats_infer_real() {
        assert_eq!(classify(&[Some("1"), Some("2.5")]), ColumnType::Real);
    }

    #[test]
    fn test_mixed_numeric_and_text_infer_text() {
        assert_eq!(classify(&[Some("1"), Some("two")]), ColumnType::Text);
    }

    #[test]
    fn test_integers_with_missing_cells_infer_real() {
        assert_eq!(classify(&[Some("1"), None, Some("3")]), ColumnType::Real);
    }

    #[test]
    fn test_all_null_column_infers_real() {
        assert_eq!(classify(&[None, None]), ColumnType::Real);
    }

    #[test]
    fn test_integer_overflowing_i64_infers_real() {
        // Larger than i64::MAX, still numeric.
        assert_eq!(classify(&[Some("9223372036854775808")]), ColumnType::Real);
    }

    #[test]
    fn test_whitespace_padded_numbers_still_numeric() {
        assert_eq!(classify(&[Some(" 7"), Some("8 ")]), ColumnType::Integer);
    }

    #[test]
    fn test_infer_over_dataset_is_per_column() {
        use crate::merge::MergedDataset;

        let dataset = MergedDataset {
            columns: vec!["id".to_string(), "amount".to_string(), "note".to_string()],
            rows: vec![
                vec![Some("1".to_string()), Some("9.5".to_string()), Some("a".to_string())],
                vec![Some("2".to_string()), Some("3".to_string()), None],
            ],
        };
        assert_eq!(
            infer_column_types(&dataset),
            vec![ColumnType::Integer, ColumnType::Real, ColumnType::Text]
        );
    }
}
