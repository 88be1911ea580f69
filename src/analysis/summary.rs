use crate::analysis::types::ColumnSummary;
use crate::analysis::utility::{mean, quantile, stddev};
use crate::table::Table;

/// Descriptive statistics for every numeric column, in table order.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .numeric_columns()
        .into_iter()
        .filter_map(|column| {
            let values = table.column(&column)?;
            let mut numbers = Vec::new();
            let mut missing = 0;
            for v in values {
                match v.as_f64() {
                    Some(n) => numbers.push(n),
                    None => missing += 1,
                }
            }
            numbers.sort_by(f64::total_cmp);

            let avg = mean(&numbers);
            Some(ColumnSummary {
                count: numbers.len(),
                missing,
                mean: avg,
                std: avg.and_then(|m| stddev(&numbers, m)),
                min: numbers.first().copied(),
                p25: quantile(&numbers, 0.25),
                p50: quantile(&numbers, 0.5),
                p75: quantile(&numbers, 0.75),
                max: numbers.last().copied(),
                column,
            })
        })
        .collect()
}
