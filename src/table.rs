//! Row-oriented in-memory table.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::DataSourceError;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Missing,
}

/// Field spellings read as a missing value.
pub const NA_TOKENS: [&str; 20] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "inf", "-inf",
];

impl Scalar {
    /// Classifies a raw field.
    ///
    /// Empty fields and [`NA_TOKENS`] are missing. Anything `f64` accepts is a
    /// number, except non-finite values (`Infinity`, `+inf`, ...) which are
    /// also missing so they never reach an aggregate.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || NA_TOKENS.contains(&raw) {
            return Scalar::Missing;
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Scalar::Number(n),
            Ok(_) => Scalar::Missing,
            Err(_) => Scalar::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Scalar::Missing)
    }
}

/// Formats a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Missing => Ok(()),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(f64::from(n))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

/// Ordered rows sharing one column set.
///
/// Every row holds exactly one value per column; the constructors enforce
/// it and nothing mutates a table once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Builds a table from a header and rows, checking every row's width.
    pub fn new(
        origin: &str,
        columns: Vec<String>,
        rows: Vec<Vec<Scalar>>,
    ) -> Result<Self, DataSourceError> {
        if columns.is_empty() {
            return Err(DataSourceError::NoColumns {
                origin: origin.to_string(),
            });
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DataSourceError::DuplicateColumn {
                    origin: origin.to_string(),
                    column: name.clone(),
                });
            }
        }

        if let Some(record) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(DataSourceError::InconsistentRecord {
                origin: origin.to_string(),
                record,
            });
        }

        Ok(Table {
            columns,
            index,
            rows,
        })
    }

    /// Builds a table from a literal record list.
    ///
    /// The first record fixes the column order. A record whose column set
    /// differs from the first one is rejected.
    pub fn from_records<I, R, K, V>(records: I) -> Result<Self, DataSourceError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        const ORIGIN: &str = "in-memory records";

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows = Vec::new();

        for (record_no, record) in records.into_iter().enumerate() {
            let pairs: Vec<(String, Scalar)> = record
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();

            if record_no == 0 {
                for (name, _) in &pairs {
                    if index.insert(name.clone(), columns.len()).is_some() {
                        return Err(DataSourceError::DuplicateColumn {
                            origin: ORIGIN.to_string(),
                            column: name.clone(),
                        });
                    }
                    columns.push(name.clone());
                }
            }

            let inconsistent = || DataSourceError::InconsistentRecord {
                origin: ORIGIN.to_string(),
                record: record_no,
            };

            if pairs.len() != columns.len() {
                return Err(inconsistent());
            }

            let mut row = vec![Scalar::Missing; columns.len()];
            let mut seen = vec![false; columns.len()];
            for (name, value) in pairs {
                let i = *index.get(&name).ok_or_else(inconsistent)?;
                if seen[i] {
                    return Err(inconsistent());
                }
                seen[i] = true;
                row[i] = value;
            }
            rows.push(row);
        }

        Table::new(ORIGIN, columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the names from `required` that this table lacks.
    pub fn missing_columns<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(String::as_str)
            .collect()
    }

    /// Iterates over one column's values in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Scalar> + '_> {
        let i = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[i]))
    }

    /// True when the column has at least one value and every non-missing value is a number.
    pub fn is_numeric(&self, name: &str) -> bool {
        let Some(values) = self.column(name) else {
            return false;
        };
        let mut any = false;
        for v in values {
            match v {
                Scalar::Number(_) => any = true,
                Scalar::Missing => {}
                Scalar::Text(_) => return false,
            }
        }
        any
    }

    /// Names of all numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| self.is_numeric(c))
            .cloned()
            .collect()
    }

    /// Returns a copy of the table without `name`. Unknown names return an unchanged copy.
    pub fn without_column(&self, name: &str) -> Table {
        let Some(drop) = self.column_index(name) else {
            return self.clone();
        };
        let columns: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != drop)
            .map(|(_, c)| c.clone())
            .collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != drop)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect();
        Table {
            columns,
            index,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_records(vec![
            vec![("occ", Scalar::from("A")), ("stress", Scalar::from(2))],
            vec![("occ", Scalar::from("A")), ("stress", Scalar::from(8))],
            vec![("occ", Scalar::from("B")), ("stress", Scalar::Missing)],
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_classifies_fields() {
        assert_eq!(Scalar::parse(""), Scalar::Missing);
        assert_eq!(Scalar::parse("  "), Scalar::Missing);
        assert_eq!(Scalar::parse("6.5"), Scalar::Number(6.5));
        assert_eq!(Scalar::parse(" 7 "), Scalar::Number(7.0));
        assert_eq!(Scalar::parse("Student"), Scalar::Text("Student".into()));
    }

    #[test]
    fn test_parse_na_tokens_are_missing() {
        for token in NA_TOKENS {
            assert_eq!(Scalar::parse(token), Scalar::Missing, "{token}");
        }
        assert_eq!(Scalar::parse(" NA "), Scalar::Missing);
        assert_eq!(Scalar::parse("Infinity"), Scalar::Missing);
        assert_eq!(Scalar::parse("+inf"), Scalar::Missing);
        // Near misses stay text.
        assert_eq!(Scalar::parse("Na"), Scalar::Text("Na".into()));
        assert_eq!(Scalar::parse("NAN!"), Scalar::Text("NAN!".into()));
    }

    #[test]
    fn test_format_number_drops_integral_fraction() {
        assert_eq!(format_number(38.0), "38");
        assert_eq!(format_number(18.5), "18.5");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn test_from_records_keeps_first_record_order() {
        let table = Table::from_records(vec![
            vec![("b", 1), ("a", 2)],
            vec![("a", 4), ("b", 3)],
        ])
        .unwrap();

        assert_eq!(table.columns(), ["b", "a"]);
        assert_eq!(table.rows()[1], vec![Scalar::Number(3.0), Scalar::Number(4.0)]);
    }

    #[test]
    fn test_from_records_rejects_inconsistent_record() {
        let err = Table::from_records(vec![vec![("a", 1), ("b", 2)], vec![("a", 1), ("c", 2)]])
            .unwrap_err();
        assert!(matches!(err, DataSourceError::InconsistentRecord { record: 1, .. }));

        let err = Table::from_records(vec![vec![("a", 1), ("b", 2)], vec![("a", 1)]]).unwrap_err();
        assert!(matches!(err, DataSourceError::InconsistentRecord { record: 1, .. }));
    }

    #[test]
    fn test_new_rejects_short_row() {
        let err = Table::new(
            "test",
            vec!["a".into(), "b".into()],
            vec![vec![Scalar::Number(1.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, DataSourceError::InconsistentRecord { record: 0, .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_column() {
        let err = Table::new("test", vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert!(matches!(err, DataSourceError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_numeric_columns() {
        let table = sample();
        assert!(table.is_numeric("stress"));
        assert!(!table.is_numeric("occ"));
        assert!(!table.is_numeric("nope"));
        assert_eq!(table.numeric_columns(), vec!["stress".to_string()]);
    }

    #[test]
    fn test_without_column() {
        let table = sample();
        let trimmed = table.without_column("occ");

        assert_eq!(trimmed.columns(), ["stress"]);
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed.column_index("stress"), Some(0));
        assert!(!trimmed.has_column("occ"));
        assert_eq!(table.without_column("nope"), table);
    }

    #[test]
    fn test_missing_columns() {
        let table = sample();
        let required = vec!["occ".to_string(), "age".to_string()];
        assert_eq!(table.missing_columns(&required), vec!["age"]);
    }
}
