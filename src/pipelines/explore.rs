//! Exploratory charts over an arbitrary CSV file.

use anyhow::{Result, bail};
use chrono::Local;
use std::path::Path;
use tracing::info;

use super::columns::{AGE, CAFFEINE, OCCUPATION, PHONE, STRESS};
use super::{RunSummary, publish};
use crate::analysis::{
    AggFunc, Aggregate, Grouping, KeyOrder, aggregate, correlation_matrix, describe, distribution,
};
use crate::error::AnalysisError;
use crate::loader::load_csv;
use crate::output::write_json;
use crate::report::{Chart, Plan, ReportDocument, Shape};
use crate::table::Table;

fn mean_by(table: &Table, group: &str, metric: &str) -> Result<Aggregate, AnalysisError> {
    aggregate(table, &Grouping::Column(group), metric, AggFunc::Mean, &KeyOrder::Natural)
}

/// The chart plan, in output order.
pub fn plan() -> Plan<'static, Chart> {
    Plan::new()
        .step("phone_by_occupation", &[OCCUPATION, PHONE], |t| {
            let agg = mean_by(t, OCCUPATION, PHONE)?;
            Ok(Chart::from_aggregate(Shape::Bar, "Average Daily Phone Usage per Occupation", &agg)
                .axes("Occupation", "Average Daily Phone Hours"))
        })
        .step("stress_by_occupation", &[OCCUPATION, STRESS], |t| {
            let agg = mean_by(t, OCCUPATION, STRESS)?;
            Ok(Chart::from_aggregate(Shape::Bar, "Average Stress Level per Occupation", &agg)
                .axes("Occupation", "Average Stress Level"))
        })
        .step("stress_by_age", &[AGE, STRESS], |t| {
            let agg = mean_by(t, AGE, STRESS)?;
            Ok(Chart::from_aggregate(Shape::Line, "Average Stress Level by Age", &agg)
                .axes("Age", "Average Stress Level"))
        })
        .step("caffeine_by_occupation", &[OCCUPATION, CAFFEINE], |t| {
            let agg = mean_by(t, OCCUPATION, CAFFEINE)?;
            Ok(Chart::from_aggregate(Shape::Bar, "Average Caffeine Intake per Occupation", &agg)
                .axes("Occupation", "Average Caffeine Intake (Cups)"))
        })
        .step("stress_distribution", &[STRESS], |t| {
            let agg = distribution(t, STRESS, &KeyOrder::Natural)?;
            Ok(Chart::from_aggregate(Shape::Pie, "Stress Level Distribution", &agg))
        })
        .step("occupation_distribution", &[OCCUPATION], |t| {
            let agg = distribution(t, OCCUPATION, &KeyOrder::CountDescending)?;
            Ok(Chart::from_aggregate(Shape::Pie, "Occupation Distribution", &agg))
        })
        .step("correlation_matrix", &[], |t| {
            let columns = t.numeric_columns();
            if columns.is_empty() {
                bail!("table has no numeric columns");
            }
            let matrix = correlation_matrix(t, &columns)?;
            Ok(Chart::heatmap("Correlation Matrix", &matrix))
        })
}

/// Loads `input`, logs its shape and summary, and writes every chart the
/// table supports into `out_dir`.
#[tracing::instrument(skip_all, fields(input = %input.display(), out_dir = %out_dir.display()))]
pub fn run(input: &Path, out_dir: &Path) -> Result<RunSummary> {
    let table = load_csv(input)?;
    info!(rows = table.len(), columns = table.columns().len(), "Dataset shape");
    info!(columns = ?table.columns(), "Columns in dataset");

    let summary = describe(&table);
    for s in &summary {
        info!(
            column = %s.column,
            count = s.count,
            missing = s.missing,
            mean = ?s.mean,
            std = ?s.std,
            min = ?s.min,
            median = ?s.p50,
            max = ?s.max,
            "Column summary"
        );
    }
    write_json(out_dir.join("summary.json"), &summary)?;

    let outcome = plan().run(&table);

    let mut document = ReportDocument::create(
        out_dir.join("exploration.html"),
        "Exploratory Data Analysis",
        Local::now(),
    )?;
    let mut result = publish(outcome, out_dir, &mut document)?;
    result.document = Some(document.finish()?);

    info!(
        written = result.written.len(),
        skipped = result.skipped.len(),
        "Exploration finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SkipReason;
    use crate::table::Scalar;

    fn table() -> Table {
        let rows = [
            ("Student", 22, 6.5, 7, 3.0),
            ("Student", 23, 7.0, 8, 2.0),
            ("Freelancer", 30, 6.0, 4, 3.5),
            ("Professional", 41, 5.5, 5, 2.5),
        ];
        Table::from_records(rows.iter().map(|(occ, age, phone, stress, caffeine)| {
            vec![
                (OCCUPATION, Scalar::from(*occ)),
                (AGE, Scalar::from(*age)),
                (PHONE, Scalar::from(*phone)),
                (STRESS, Scalar::from(*stress)),
                (CAFFEINE, Scalar::from(*caffeine)),
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_full_table_produces_all_charts() {
        let outcome = plan().run(&table());
        assert_eq!(outcome.produced.len(), 7);
        assert!(outcome.skipped.is_empty());

        let occupations = &outcome.produced[5].artifact;
        assert_eq!(occupations.categories[0], "Student");
        assert_eq!(occupations.series[0].values[0], Some(2.0));

        let by_age = &outcome.produced[2].artifact;
        assert_eq!(by_age.shape, Shape::Line);
        assert_eq!(by_age.categories, ["22", "23", "30", "41"]);
    }

    #[test]
    fn test_missing_caffeine_skips_one_chart() {
        let outcome = plan().run(&table().without_column(CAFFEINE));
        assert_eq!(outcome.produced.len(), 6);
        assert_eq!(outcome.skipped[0].name, "caffeine_by_occupation");
        assert!(matches!(outcome.skipped[0].reason, SkipReason::MissingColumns(_)));
    }

    #[test]
    fn test_text_only_table_skips_correlation() {
        let table = Table::from_records(vec![vec![("name", Scalar::from("x"))]]).unwrap();
        let outcome = plan().run(&table);
        assert!(outcome.produced.is_empty());
        let last = outcome.skipped.last().unwrap();
        assert_eq!(last.name, "correlation_matrix");
        assert!(matches!(last.reason, SkipReason::Failed(_)));
    }
}
