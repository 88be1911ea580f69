//! Data types produced by the aggregation layer.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::table::format_number;

/// The value rows are partitioned by.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// A text value of a categorical column.
    Category(String),
    /// A numeric value used directly as a key, e.g. an age.
    Value(f64),
    /// The label of the band a continuous value was bucketed into.
    Band(String),
}

impl GroupKey {
    fn rank(&self) -> u8 {
        match self {
            GroupKey::Value(_) => 0,
            GroupKey::Category(_) => 1,
            GroupKey::Band(_) => 2,
        }
    }

    /// `-0.0` and `0.0` are one key.
    fn normalized(v: f64) -> f64 {
        if v == 0.0 { 0.0 } else { v }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Value(a), GroupKey::Value(b)) => {
                Self::normalized(*a).total_cmp(&Self::normalized(*b))
            }
            (GroupKey::Category(a), GroupKey::Category(b))
            | (GroupKey::Band(a), GroupKey::Band(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            GroupKey::Value(v) => Self::normalized(*v).to_bits().hash(state),
            GroupKey::Category(s) | GroupKey::Band(s) => s.hash(state),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Value(v) => f.write_str(&format_number(*v)),
            GroupKey::Category(s) | GroupKey::Band(s) => f.write_str(s),
        }
    }
}

/// Summary function applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Mean,
    Median,
    Count,
}

/// Order of the keys in an [`Aggregate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum KeyOrder {
    /// Ascending key order.
    #[default]
    Natural,
    /// Order in which keys first appear in the table.
    FirstSeen,
    /// Largest value first, ties broken by key order.
    CountDescending,
    /// Exactly these labels, in this order; other keys are dropped.
    Fixed(Vec<String>),
}

/// Per-group summary of one metric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub group_by: String,
    pub metric: String,
    pub func: AggFunc,
    pub entries: Vec<(GroupKey, f64)>,
}

impl Aggregate {
    /// Value for the group whose label is `label`.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k.label() == label)
            .map(|(_, v)| *v)
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.label()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Two-level grouping: `cells[row][series]`, `None` where no rows fell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub metric: String,
    pub func: AggFunc,
    pub row_keys: Vec<GroupKey>,
    pub series_keys: Vec<GroupKey>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Pivot {
    pub fn cell(&self, row: &str, series: &str) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| k.label() == row)?;
        let s = self.series_keys.iter().position(|k| k.label() == series)?;
        self.cells[r][s]
    }

    /// Values of one series across all rows.
    pub fn series_values(&self, series: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[series]).collect()
    }
}

/// Means of several metrics over the rows of one band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub label: String,
    pub rows: usize,
    pub means: Vec<(String, Option<f64>)>,
}

impl Profile {
    pub fn mean_of(&self, metric: &str) -> Option<f64> {
        self.means
            .iter()
            .find(|(m, _)| m == metric)
            .and_then(|(_, v)| *v)
    }
}

/// Symmetric Pearson correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_group_key_ordering() {
        let mut keys = vec![
            GroupKey::Category("b".into()),
            GroupKey::Value(30.0),
            GroupKey::Category("a".into()),
            GroupKey::Value(-2.0),
        ];
        keys.sort();
        let labels: Vec<_> = keys.iter().map(GroupKey::label).collect();
        assert_eq!(labels, ["-2", "30", "a", "b"]);
    }

    #[test]
    fn test_group_key_zero_is_one_key() {
        let mut set = HashSet::new();
        set.insert(GroupKey::Value(0.0));
        set.insert(GroupKey::Value(-0.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_aggregate_lookup() {
        let agg = Aggregate {
            group_by: "occ".into(),
            metric: "stress".into(),
            func: AggFunc::Mean,
            entries: vec![
                (GroupKey::Category("A".into()), 5.0),
                (GroupKey::Category("B".into()), 4.0),
            ],
        };
        assert_eq!(agg.get("B"), Some(4.0));
        assert_eq!(agg.get("C"), None);
        assert_eq!(agg.labels(), ["A", "B"]);
        assert_eq!(agg.values(), [5.0, 4.0]);
    }
}
