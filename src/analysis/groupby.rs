use std::collections::HashMap;
use tracing::{debug, warn};

use crate::analysis::bands::{Band, BandTable};
use crate::analysis::types::{AggFunc, Aggregate, GroupKey, KeyOrder, Pivot, Profile};
use crate::analysis::utility::{mean, median};
use crate::error::AnalysisError;
use crate::table::{Scalar, Table};

/// How rows are partitioned.
#[derive(Debug, Clone)]
pub enum Grouping<'a> {
    /// Group by the raw values of a column.
    Column(&'a str),
    /// Bucket a continuous column into bands and group by band label.
    Banded { column: &'a str, bands: &'a BandTable },
}

impl Grouping<'_> {
    pub fn column(&self) -> &str {
        match self {
            Grouping::Column(c) => c,
            Grouping::Banded { column, .. } => column,
        }
    }

    fn key_of(&self, value: &Scalar) -> Option<GroupKey> {
        match (self, value) {
            (_, Scalar::Missing) => None,
            (Grouping::Column(_), Scalar::Number(n)) => Some(GroupKey::Value(*n)),
            (Grouping::Column(_), Scalar::Text(s)) => Some(GroupKey::Category(s.clone())),
            (Grouping::Banded { bands, .. }, Scalar::Number(n)) => {
                bands.bucket(*n).map(|l| GroupKey::Band(l.to_string()))
            }
            (Grouping::Banded { .. }, Scalar::Text(_)) => None,
        }
    }
}

fn column_index(table: &Table, name: &str) -> Result<usize, AnalysisError> {
    table
        .column_index(name)
        .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
}

fn metric_value(
    table: &Table,
    row: usize,
    col: usize,
) -> Result<Option<f64>, AnalysisError> {
    match &table.rows()[row][col] {
        Scalar::Number(n) => Ok(Some(*n)),
        Scalar::Missing => Ok(None),
        Scalar::Text(s) => Err(AnalysisError::NonNumeric {
            column: table.columns()[col].clone(),
            row,
            value: s.clone(),
        }),
    }
}

/// Every number in `column`, skipping missing cells.
pub fn column_values(table: &Table, column: &str) -> Result<Vec<f64>, AnalysisError> {
    let col = column_index(table, column)?;
    let mut values = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        if let Some(v) = metric_value(table, row, col)? {
            values.push(v);
        }
    }
    Ok(values)
}

/// Collects metric values per key, preserving first-seen key order.
///
/// Count treats any non-missing value as present, so text columns can be counted.
fn collect_groups(
    table: &Table,
    grouping: &Grouping<'_>,
    metric: &str,
    func: AggFunc,
) -> Result<Vec<(GroupKey, Vec<f64>)>, AnalysisError> {
    let group_col = column_index(table, grouping.column())?;
    let metric_col = column_index(table, metric)?;

    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<f64>)> = Vec::new();
    let mut unbanded = 0usize;

    for (i, row) in table.rows().iter().enumerate() {
        let Some(key) = grouping.key_of(&row[group_col]) else {
            if matches!(grouping, Grouping::Banded { .. }) && !row[group_col].is_missing() {
                unbanded += 1;
            }
            continue;
        };

        let value = if func == AggFunc::Count {
            (!row[metric_col].is_missing()).then_some(1.0)
        } else {
            metric_value(table, i, metric_col)?
        };
        let Some(value) = value else { continue };

        let slot = *slots.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(value);
    }

    if unbanded > 0 {
        debug!(
            column = grouping.column(),
            excluded = unbanded,
            "Rows outside every band excluded"
        );
    }

    Ok(groups)
}

pub(crate) fn summarize(values: &[f64], func: AggFunc) -> Option<f64> {
    match func {
        AggFunc::Mean => mean(values),
        AggFunc::Median => median(values),
        AggFunc::Count => (!values.is_empty()).then(|| values.len() as f64),
    }
}

fn apply_order(entries: &mut Vec<(GroupKey, f64)>, order: &KeyOrder, context: &str) {
    match order {
        KeyOrder::FirstSeen => {}
        KeyOrder::Natural => entries.sort_by(|a, b| a.0.cmp(&b.0)),
        KeyOrder::CountDescending => {
            entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        }
        KeyOrder::Fixed(labels) => {
            let mut by_label: HashMap<String, (GroupKey, f64)> = entries
                .drain(..)
                .map(|(k, v)| (k.label(), (k, v)))
                .collect();
            for label in labels {
                match by_label.remove(label) {
                    Some(entry) => entries.push(entry),
                    None => warn!(context, category = %label, "Category has no rows, omitted"),
                }
            }
            if !by_label.is_empty() {
                debug!(
                    context,
                    dropped = by_label.len(),
                    "Categories outside the fixed order dropped"
                );
            }
        }
    }
}

/// Groups `table` and summarises `metric` in each group.
///
/// Rows with a missing grouping value, or a banded value outside every band,
/// are excluded. Missing metric values are skipped. Groups left without
/// values are omitted rather than reported as `NaN`.
pub fn aggregate(
    table: &Table,
    grouping: &Grouping<'_>,
    metric: &str,
    func: AggFunc,
    order: &KeyOrder,
) -> Result<Aggregate, AnalysisError> {
    let groups = collect_groups(table, grouping, metric, func)?;

    let mut entries: Vec<(GroupKey, f64)> = groups
        .into_iter()
        .filter_map(|(key, values)| summarize(&values, func).map(|v| (key, v)))
        .collect();

    let band_order;
    let order = match grouping {
        Grouping::Banded { bands, .. } if !matches!(order, KeyOrder::Fixed(_)) => {
            band_order = KeyOrder::Fixed(bands.labels());
            &band_order
        }
        _ => order,
    };
    apply_order(&mut entries, order, metric);

    Ok(Aggregate {
        group_by: grouping.column().to_string(),
        metric: metric.to_string(),
        func,
        entries,
    })
}

/// Frequency of each distinct value of `column`.
pub fn distribution(
    table: &Table,
    column: &str,
    order: &KeyOrder,
) -> Result<Aggregate, AnalysisError> {
    aggregate(table, &Grouping::Column(column), column, AggFunc::Count, order)
}

/// Row counts per key in first-seen order.
#[derive(Default)]
struct Tally {
    slots: HashMap<GroupKey, usize>,
    counts: Vec<(GroupKey, f64)>,
}

impl Tally {
    fn add(&mut self, key: &GroupKey) {
        match self.slots.get(key) {
            Some(&i) => self.counts[i].1 += 1.0,
            None => {
                self.slots.insert(key.clone(), self.counts.len());
                self.counts.push((key.clone(), 1.0));
            }
        }
    }
}

fn ordered_keys(mut keys: Vec<(GroupKey, f64)>, order: &KeyOrder, context: &str) -> Vec<GroupKey> {
    apply_order(&mut keys, order, context);
    keys.into_iter().map(|(k, _)| k).collect()
}

/// Two-level grouping of `metric` by `rows` × `series`.
pub fn pivot(
    table: &Table,
    rows: &str,
    series: &str,
    metric: &str,
    func: AggFunc,
    row_order: &KeyOrder,
    series_order: &KeyOrder,
) -> Result<Pivot, AnalysisError> {
    let row_col = column_index(table, rows)?;
    let series_col = column_index(table, series)?;
    let metric_col = column_index(table, metric)?;

    let mut row_counts = Tally::default();
    let mut series_counts = Tally::default();
    let mut cells: HashMap<(GroupKey, GroupKey), Vec<f64>> = HashMap::new();

    for (i, row) in table.rows().iter().enumerate() {
        let (Some(r), Some(s)) = (
            Grouping::Column(rows).key_of(&row[row_col]),
            Grouping::Column(series).key_of(&row[series_col]),
        ) else {
            continue;
        };
        let value = if func == AggFunc::Count {
            (!row[metric_col].is_missing()).then_some(1.0)
        } else {
            metric_value(table, i, metric_col)?
        };
        let Some(value) = value else { continue };

        row_counts.add(&r);
        series_counts.add(&s);
        cells.entry((r, s)).or_default().push(value);
    }

    let row_keys = ordered_keys(row_counts.counts, row_order, rows);
    let series_keys = ordered_keys(series_counts.counts, series_order, series);

    let cells = row_keys
        .iter()
        .map(|r| {
            series_keys
                .iter()
                .map(|s| {
                    cells
                        .get(&(r.clone(), s.clone()))
                        .and_then(|values| summarize(values, func))
                })
                .collect()
        })
        .collect();

    Ok(Pivot {
        metric: metric.to_string(),
        func,
        row_keys,
        series_keys,
        cells,
    })
}

/// Means of `metrics` over the rows whose `filter_column` value lies in `band`.
pub fn profile(
    table: &Table,
    filter_column: &str,
    band: &Band,
    metrics: &[&str],
) -> Result<Profile, AnalysisError> {
    let filter_col = column_index(table, filter_column)?;
    let metric_cols = metrics
        .iter()
        .map(|m| column_index(table, m))
        .collect::<Result<Vec<_>, _>>()?;

    let selected: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row[filter_col].as_f64().is_some_and(|v| band.contains(v)))
        .map(|(i, _)| i)
        .collect();

    let mut means = Vec::with_capacity(metrics.len());
    for (name, &col) in metrics.iter().zip(&metric_cols) {
        let mut values = Vec::with_capacity(selected.len());
        for &i in &selected {
            if let Some(v) = metric_value(table, i, col)? {
                values.push(v);
            }
        }
        means.push((name.to_string(), mean(&values)));
    }

    Ok(Profile {
        label: band.label.clone(),
        rows: selected.len(),
        means,
    })
}
