//! Gordian - Result rendering
//!
//! Plain-text and JSON views of a [`Classification`], with combinations
//! spelled out by column name.

use std::fmt::Write;

use serde::Serialize;

use crate::classifier::{Classification, ColumnCombination};

/// Named view of a classification, ready to print or serialize.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub columns: &'a [String],
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity_cap: Option<usize>,
    pub minimal_unique: Vec<Vec<&'a str>>,
    pub maximal_non_unique: Vec<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<Vec<Vec<&'a str>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_unique: Option<Vec<Vec<&'a str>>>,
}

impl<'a> Report<'a> {
    /// `include_all` adds the full unique and non-unique sets.
    pub fn new(classification: &'a Classification, include_all: bool) -> Self {
        let columns = classification.columns();
        let named = |combos: Vec<&ColumnCombination>| -> Vec<Vec<&'a str>> {
            combos.into_iter().map(|c| c.names(columns)).collect()
        };

        Self {
            columns,
            rows: classification.row_count(),
            arity_cap: classification.arity_cap(),
            minimal_unique: named(classification.minimal_unique()),
            maximal_non_unique: named(classification.maximal_non_unique()),
            unique: include_all.then(|| named(classification.unique().iter().collect())),
            non_unique: include_all.then(|| named(classification.non_unique().iter().collect())),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Analyzed {} rows x {} columns",
            self.rows,
            self.columns.len()
        );

        out.push_str("\nMinimal unique column combinations (candidate keys):\n");
        if self.minimal_unique.is_empty() {
            match self.arity_cap {
                Some(cap) => {
                    let _ = writeln!(out, "  none within {} columns", cap);
                }
                None => out.push_str("  none - no column combination identifies every row\n"),
            }
        }
        write_combos(&mut out, &self.minimal_unique);

        out.push_str("\nMaximal non-unique column combinations:\n");
        if self.maximal_non_unique.is_empty() {
            out.push_str("  none\n");
        }
        write_combos(&mut out, &self.maximal_non_unique);

        if let Some(unique) = &self.unique {
            let _ = writeln!(out, "\nAll unique combinations ({}):", unique.len());
            write_combos(&mut out, unique);
        }
        if let Some(non_unique) = &self.non_unique {
            let _ = writeln!(out, "\nAll non-unique combinations ({}):", non_unique.len());
            write_combos(&mut out, non_unique);
        }
        out
    }
}

fn write_combos(out: &mut String, combos: &[Vec<&str>]) {
    for combo in combos {
        let _ = writeln!(out, "  {{{}}}", combo.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, KeySearch};
    use crate::dataset::{Dataset, Row};

    fn scenario() -> Classification {
        let dataset = Dataset::new(
            vec!["A".to_string(), "B".to_string()],
            vec![Row::new(["1", "x"]), Row::new(["2", "x"]), Row::new(["3", "y"])],
        )
        .unwrap();
        classify(&dataset).unwrap()
    }

    #[test]
    fn test_report_names_combinations() {
        let result = scenario();
        let report = Report::new(&result, false);
        assert_eq!(report.rows, 3);
        assert_eq!(report.minimal_unique, vec![vec!["A"]]);
        assert_eq!(report.maximal_non_unique, vec![vec!["B"]]);
        assert!(report.unique.is_none());
    }

    #[test]
    fn test_render_text() {
        let result = scenario();
        let text = Report::new(&result, true).render_text();
        assert!(text.starts_with("Analyzed 3 rows x 2 columns"));
        assert!(text.contains("candidate keys):\n  {A}\n"));
        assert!(text.contains("All unique combinations (2):\n  {A}\n  {A, B}\n"));
        assert!(text.contains("All non-unique combinations (1):\n  {B}\n"));
    }

    #[test]
    fn test_render_text_without_key() {
        let dataset = Dataset::new(
            vec!["A".to_string()],
            vec![Row::new(["1"]), Row::new(["1"])],
        )
        .unwrap();
        let result = classify(&dataset).unwrap();
        let text = Report::new(&result, false).render_text();
        assert!(text.contains("none - no column combination identifies every row"));
    }

    #[test]
    fn test_render_text_with_arity_cap() {
        // Only {A, B} identifies every row; a cap of 1 never reaches it.
        let dataset = Dataset::new(
            vec!["A".to_string(), "B".to_string()],
            vec![Row::new(["1", "x"]), Row::new(["1", "y"]), Row::new(["2", "x"])],
        )
        .unwrap();
        let result = KeySearch::default()
            .with_max_arity(Some(1))
            .run(&dataset)
            .unwrap();
        let report = Report::new(&result, false);
        assert_eq!(report.arity_cap, Some(1));

        let text = report.render_text();
        assert!(text.contains("candidate keys):\n  none within 1 columns\n"));
        assert!(!text.contains("no column combination identifies every row"));
    }

    #[test]
    fn test_capped_sweep_still_finds_narrow_key() {
        let dataset = Dataset::new(
            vec!["A".to_string(), "B".to_string()],
            vec![Row::new(["1", "x"]), Row::new(["2", "x"])],
        )
        .unwrap();
        let result = KeySearch::default()
            .with_max_arity(Some(1))
            .run(&dataset)
            .unwrap();
        let text = Report::new(&result, false).render_text();
        assert!(text.contains("candidate keys):\n  {A}\n"));
    }

    #[test]
    fn test_json_report() {
        let result = scenario();
        let json = Report::new(&result, false).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["minimal_unique"], serde_json::json!([["A"]]));
        assert_eq!(value["columns"], serde_json::json!(["A", "B"]));
        assert!(value.get("unique").is_none());
    }
}
