//! Gordian - In-memory tabular dataset
//!
//! An ordered column schema plus rows aligned to it. Every value is
//! normalized on the way in so the trie and the key search only ever compare
//! canonical strings.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// Placeholder for a cell that has no value (empty CSV cell, absent or
/// `null` JSON field). Already in normalized form.
pub const MISSING_VALUE: &str = "nan";

/// Canonical form of a raw cell: surrounding whitespace trimmed, lowercased.
///
/// Equality is purely textual, so `"1"` and `"1.0"` stay distinct.
pub fn normalize_value(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One row of normalized values, positionally aligned with the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    /// Build a row from raw values, normalizing each one.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            values
                .into_iter()
                .map(|v| normalize_value(v.as_ref()))
                .collect(),
        )
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.0.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered column schema plus the rows aligned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Assemble a dataset, rejecting duplicate column names and rows whose
    /// length differs from the schema.
    ///
    /// Zero rows is accepted here; the key search reports it as
    /// [`AnalysisError::EmptyDataset`].
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(AnalysisError::DuplicateColumn { name: name.clone() });
            }
        }
        check_row_widths(columns.len(), &rows)?;
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fail on the first row whose length differs from `width`.
pub(crate) fn check_row_widths(width: usize, rows: &[Row]) -> Result<()> {
    match rows.iter().position(|row| row.len() != width) {
        Some(row) => Err(AnalysisError::SchemaMismatch {
            row,
            expected: width,
            found: rows[row].len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("  Max Payne \t"), "max payne");
        assert_eq!(normalize_value("1234"), "1234");
        assert_ne!(normalize_value("1.0"), normalize_value("1"));
    }

    #[test]
    fn test_row_normalizes_values() {
        let row = Row::new(["  Foo", "BAR  ", "42"]);
        assert_eq!(row.values(), &["foo", "bar", "42"]);
        assert_eq!(row.get(1), Some("bar"));
        assert_eq!(row.get(3), None);
    }

    #[test]
    fn test_dataset_accepts_aligned_rows() {
        let dataset = Dataset::new(
            columns(&["A", "B"]),
            vec![Row::new(["1", "x"]), Row::new(["2", "y"])],
        )
        .unwrap();
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.row_count(), 2);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn test_dataset_rejects_short_row() {
        let err = Dataset::new(
            columns(&["A", "B"]),
            vec![Row::new(["1", "x"]), Row::new(["2"])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::SchemaMismatch {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_dataset_rejects_duplicate_columns() {
        let err = Dataset::new(columns(&["A", "A"]), vec![]).unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateColumn { name } if name == "A"));
    }

    #[test]
    fn test_dataset_allows_zero_rows() {
        let dataset = Dataset::new(columns(&["A"]), vec![]).unwrap();
        assert!(dataset.is_empty());
    }
}
