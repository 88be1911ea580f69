//! Delimited-text loader.

use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::DataSourceError;
use crate::table::{Scalar, Table};

/// Where a table comes from.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Inline(String),
}

/// Loads a [`Table`] from a file path or inline CSV text.
pub fn load(source: &Source) -> Result<Table, DataSourceError> {
    match source {
        Source::Path(path) => load_csv(path),
        Source::Inline(text) => parse_csv(text.as_bytes(), "inline data"),
    }
}

/// Reads a CSV file with a header row into a [`Table`].
///
/// # Errors
///
/// Fails if the path does not exist, cannot be opened, or holds rows whose
/// field count differs from the header's.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_csv(path: impl AsRef<Path>) -> Result<Table, DataSourceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataSourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = parse_csv(file, &path.display().to_string())?;
    info!(
        rows = table.len(),
        columns = table.columns().len(),
        "Dataset loaded"
    );
    Ok(table)
}

/// Parses CSV text with a header row from any reader.
pub fn parse_csv<R: Read>(reader: R, origin: &str) -> Result<Table, DataSourceError> {
    let malformed = |source: csv::Error| DataSourceError::Malformed {
        origin: origin.to_string(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(DataSourceError::NoColumns {
            origin: origin.to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(malformed)?;
        rows.push(record.iter().map(Scalar::parse).collect());
    }
    debug!(origin, rows = rows.len(), "Parsed CSV records");

    Table::new(origin, columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AggFunc, Grouping, KeyOrder, aggregate};
    use std::io::Write;

    #[test]
    fn test_parse_csv_types_fields() {
        let text = "Occupation,Stress_Level,Age\nStudent,7,21\nFreelancer,,35\n";
        let table = parse_csv(text.as_bytes(), "test").unwrap();

        assert_eq!(table.columns(), ["Occupation", "Stress_Level", "Age"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][0], Scalar::Text("Student".into()));
        assert_eq!(table.rows()[0][1], Scalar::Number(7.0));
        assert_eq!(table.rows()[1][1], Scalar::Missing);
    }

    #[test]
    fn test_na_tokens_keep_column_numeric() {
        let text = "Group,Value\nA,2\nA,NA\nB,5\nB,nan\nA,N/A\n";
        let table = parse_csv(text.as_bytes(), "na").unwrap();

        assert!(table.is_numeric("Value"));
        assert_eq!(table.rows()[1][1], Scalar::Missing);
        assert_eq!(table.rows()[3][1], Scalar::Missing);

        let agg = aggregate(
            &table,
            &Grouping::Column("Group"),
            "Value",
            AggFunc::Mean,
            &KeyOrder::Natural,
        )
        .unwrap();
        assert_eq!(agg.labels(), ["A", "B"]);
        assert_eq!(agg.values(), [2.0, 5.0]);
        assert!(agg.values().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_parse_csv_rejects_ragged_rows() {
        let text = "a,b\n1,2\n3\n";
        let err = parse_csv(text.as_bytes(), "ragged").unwrap_err();
        assert!(matches!(err, DataSourceError::Malformed { .. }));
        assert!(err.to_string().contains("ragged"));
    }

    #[test]
    fn test_parse_csv_rejects_empty_input() {
        let err = parse_csv("".as_bytes(), "empty").unwrap_err();
        assert!(matches!(err, DataSourceError::NoColumns { .. }));
    }

    #[test]
    fn test_parse_csv_rejects_duplicate_header() {
        let err = parse_csv("a,a\n1,2\n".as_bytes(), "dup").unwrap_err();
        assert!(matches!(err, DataSourceError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_load_csv_missing_path_reports_path() {
        let err = load_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataSourceError::NotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn test_load_reads_file_and_inline_sources() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1,2").unwrap();
        file.flush().unwrap();

        let from_file = load(&Source::Path(file.path().to_path_buf())).unwrap();
        let inline = load(&Source::Inline("x,y\n1,2\n".to_string())).unwrap();

        assert_eq!(from_file.rows(), inline.rows());
        assert_eq!(from_file.columns(), inline.columns());
    }
}
