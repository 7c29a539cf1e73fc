//! Gordian - Multi-format input support
//!
//! Turns CSV, TSV and JSON record files into a [`Dataset`]. Files are
//! memory-mapped and parsed in place; stdin is buffered in memory.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::dataset::{Dataset, Row, MISSING_VALUE};
use crate::error::IngestError;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values with header row
    Csv,
    /// Tab-separated values with header row
    Tsv,
    /// Array of JSON objects, optionally wrapped in `{"dataset": [...]}`
    Json,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("tsv") => Ok(InputFormat::Tsv),
            Some("json") => Ok(InputFormat::Json),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse format from string (for CLI)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(InputFormat::Csv),
            "tsv" => Some(InputFormat::Tsv),
            "json" => Some(InputFormat::Json),
            _ => None,
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Member holding the record array when a JSON document is an object.
    pub dataset_key: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            dataset_key: "dataset".to_string(),
        }
    }
}

/// Storage backend for raw input bytes
enum Source {
    /// Memory-mapped file
    Mmap(Mmap),
    /// In-memory buffer (stdin or empty files)
    InMemory(Vec<u8>),
}

impl Source {
    fn open(path: &Path) -> Result<Self, IngestError> {
        let io_err = |source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();
        if size == 0 {
            return Ok(Source::InMemory(Vec::new()));
        }
        let mmap = unsafe { Mmap::map(&file).map_err(io_err)? };
        Ok(Source::Mmap(mmap))
    }

    fn stdin() -> Result<Self, IngestError> {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|source| IngestError::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        Ok(Source::InMemory(buffer))
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Source::Mmap(m) => m.as_ref(),
            Source::InMemory(v) => v.as_slice(),
        }
    }
}

/// Load a file, detecting its format from the extension unless `format` is
/// given.
pub fn load<P: AsRef<Path>>(
    path: P,
    format: Option<InputFormat>,
    options: &LoadOptions,
) -> Result<Dataset, IngestError> {
    let path = path.as_ref();
    let format = match format {
        Some(format) => format,
        None => InputFormat::detect(path)?,
    };
    let source = Source::open(path)?;
    let dataset = parse_bytes(source.as_bytes(), format, options)?;
    debug!(
        path = %path.display(),
        ?format,
        columns = dataset.column_count(),
        rows = dataset.row_count(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Load a dataset piped through stdin.
pub fn load_stdin(format: InputFormat, options: &LoadOptions) -> Result<Dataset, IngestError> {
    let source = Source::stdin()?;
    parse_bytes(source.as_bytes(), format, options)
}

/// Parse raw bytes in the given format.
pub fn parse_bytes(
    bytes: &[u8],
    format: InputFormat,
    options: &LoadOptions,
) -> Result<Dataset, IngestError> {
    match format {
        InputFormat::Csv => read_delimited(bytes, b','),
        InputFormat::Tsv => read_delimited(bytes, b'\t'),
        InputFormat::Json => read_json_records(bytes, &options.dataset_key),
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Only a truly empty cell is missing; whitespace normalizes to `""`.
fn cell_or_missing(raw: &str) -> &str {
    if raw.is_empty() {
        MISSING_VALUE
    } else {
        raw
    }
}

/// Header record becomes the schema; every later record a row.
fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Dataset, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(Row::new(record.iter().map(cell_or_missing)));
    }

    Ok(Dataset::new(columns, rows)?)
}

/// Records may carry different field sets; the schema is their union in
/// first-seen order, and absent fields are filled with the missing value.
fn read_json_records(bytes: &[u8], dataset_key: &str) -> Result<Dataset, IngestError> {
    let document: Value = serde_json::from_slice(bytes)?;
    let records = match &document {
        Value::Array(records) => records,
        Value::Object(obj) => match obj.get(dataset_key) {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(IngestError::MissingDatasetKey {
                    key: dataset_key.to_string(),
                })
            }
        },
        _ => {
            return Err(IngestError::MissingDatasetKey {
                key: dataset_key.to_string(),
            })
        }
    };

    let objects: Vec<&Map<String, Value>> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .as_object()
                .ok_or(IngestError::InvalidRecord { index })
        })
        .collect::<Result<_, _>>()?;

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            Row::new(columns.iter().map(|column| {
                obj.get(column)
                    .map_or_else(|| MISSING_VALUE.to_string(), json_cell)
            }))
        })
        .collect();

    Ok(Dataset::new(columns, rows)?)
}

/// Textual form of a JSON field value.
fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => MISSING_VALUE.to_string(),
        Value::String(s) => cell_or_missing(s).to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::detect("data.csv").unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::detect("data.TSV").unwrap(), InputFormat::Tsv);
        assert_eq!(InputFormat::detect("data.json").unwrap(), InputFormat::Json);
        assert!(matches!(
            InputFormat::detect("data.parquet"),
            Err(IngestError::UnsupportedFormat { .. })
        ));
        assert!(InputFormat::detect("data").is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(InputFormat::parse("CSV"), Some(InputFormat::Csv));
        assert_eq!(InputFormat::parse("tsv"), Some(InputFormat::Tsv));
        assert_eq!(InputFormat::parse("json"), Some(InputFormat::Json));
        assert_eq!(InputFormat::parse("xml"), None);
    }

    #[test]
    fn test_load_csv_file() -> anyhow::Result<()> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "\u{feff}id, Name ,city")?;
        writeln!(file, "1,Ann,Oslo")?;
        writeln!(file, "2,  BOB ,")?;

        let dataset = load(file.path(), None, &LoadOptions::default())?;
        assert_eq!(dataset.columns(), &["id", "Name", "city"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows()[0].values(), &["1", "ann", "oslo"]);
        assert_eq!(dataset.rows()[1].values(), &["2", "bob", MISSING_VALUE]);
        Ok(())
    }

    #[test]
    fn test_blank_cell_is_not_missing() {
        let bytes = b"a,b\n  ,1\nNaN,2\n,3\n";
        let dataset = parse_bytes(bytes, InputFormat::Csv, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.rows()[0].values(), &["", "1"]);
        assert_eq!(dataset.rows()[1].values(), &["nan", "2"]);
        assert_eq!(dataset.rows()[2].values(), &[MISSING_VALUE, "3"]);
        assert_ne!(dataset.rows()[0].values()[0], dataset.rows()[1].values()[0]);
    }

    #[test]
    fn test_tsv_delimiter() {
        let bytes = b"a\tb\n1\tx\n2\ty\n";
        let dataset = parse_bytes(bytes, InputFormat::Tsv, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.columns(), &["a", "b"]);
        assert_eq!(dataset.rows()[1].values(), &["2", "y"]);
    }

    #[test]
    fn test_ragged_csv_is_schema_mismatch() {
        let bytes = b"a,b\n1,x\n2\n";
        let err = parse_bytes(bytes, InputFormat::Csv, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Analysis(AnalysisError::SchemaMismatch {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_json_union_of_keys() {
        let bytes = br#"{"dataset": [
            {"id": 1, "name": "Ann"},
            {"id": 2, "email": "b@x.org"},
            {"name": null, "id": 3, "active": true}
        ]}"#;
        let dataset = parse_bytes(bytes, InputFormat::Json, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.columns(), &["id", "name", "email", "active"]);
        assert_eq!(dataset.rows()[0].values(), &["1", "ann", "nan", "nan"]);
        assert_eq!(dataset.rows()[1].values(), &["2", "nan", "b@x.org", "nan"]);
        assert_eq!(dataset.rows()[2].values(), &["3", "nan", "nan", "true"]);
    }

    #[test]
    fn test_json_top_level_array_and_nested_values() {
        let bytes = br#"[{"k": [1, 2], "v": {"a": "B"}}, {"k": "", "v": 1.5}]"#;
        let dataset = parse_bytes(bytes, InputFormat::Json, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.rows()[0].values(), &["[1,2]", r#"{"a":"b"}"#]);
        assert_eq!(dataset.rows()[1].values(), &["nan", "1.5"]);
    }

    #[test]
    fn test_json_custom_dataset_key() {
        let bytes = br#"{"records": [{"a": 1}]}"#;
        let options = LoadOptions {
            dataset_key: "records".to_string(),
        };
        let dataset = parse_bytes(bytes, InputFormat::Json, &options).unwrap();
        assert_eq!(dataset.row_count(), 1);

        let err = parse_bytes(bytes, InputFormat::Json, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::MissingDatasetKey { key } if key == "dataset"));
    }

    #[test]
    fn test_json_non_object_record() {
        let bytes = br#"[{"a": 1}, 42]"#;
        let err = parse_bytes(bytes, InputFormat::Json, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRecord { index: 1 }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/gordian.csv", None, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn test_load_empty_file() -> anyhow::Result<()> {
        let file = Builder::new().suffix(".csv").tempfile()?;
        let dataset = load(file.path(), None, &LoadOptions::default())?;
        assert_eq!(dataset.column_count(), 0);
        assert!(dataset.is_empty());
        Ok(())
    }
}
