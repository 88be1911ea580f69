use std::fs;
use std::path::{Path, PathBuf};

use tabular_reporter::config::ReportConfig;
use tabular_reporter::error::DataSourceError;
use tabular_reporter::loader::load_csv;
use tabular_reporter::pipelines::{explore, smartphone, weather};
use tabular_reporter::report::SkipReason;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.csv")
}

/// Copy of the fixture without `column`.
fn fixture_without(column: &str, dir: &Path) -> PathBuf {
    let content = fs::read_to_string(fixture()).unwrap();
    let mut lines = content.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let drop = header.iter().position(|c| *c == column).unwrap();

    let strip = |line: &str| {
        line.split(',')
            .enumerate()
            .filter(|(i, _)| *i != drop)
            .map(|(_, f)| f)
            .collect::<Vec<_>>()
            .join(",")
    };
    let mut out = strip(&header.join(","));
    out.push('\n');
    for line in lines {
        out.push_str(&strip(line));
        out.push('\n');
    }

    let path = dir.join(format!("without_{column}.csv"));
    fs::write(&path, out).unwrap();
    path
}

fn report_config(input: PathBuf, dir: &Path) -> ReportConfig {
    ReportConfig {
        input,
        output: dir.join("report.html"),
        charts_dir: dir.join("charts"),
        ..ReportConfig::default()
    }
}

#[test]
fn test_fixture_loads() {
    let table = load_csv(fixture()).expect("Failed to load fixture");
    assert_eq!(table.len(), 40);
    assert_eq!(table.columns().len(), 13);
    assert!(table.is_numeric("Stress_Level"));
    assert!(!table.is_numeric("Occupation"));
}

#[test]
fn test_missing_input_is_not_found() {
    let err = load_csv("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, DataSourceError::NotFound { .. }));
}

#[test]
fn test_explore_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let summary = explore::run(&fixture(), dir.path()).unwrap();

    assert!(summary.skipped.is_empty(), "{:?}", summary.skipped);
    let names: Vec<_> = summary
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "01_phone_by_occupation.svg",
            "02_stress_by_occupation.svg",
            "03_stress_by_age.svg",
            "04_caffeine_by_occupation.svg",
            "05_stress_distribution.svg",
            "06_occupation_distribution.svg",
            "07_correlation_matrix.svg",
        ]
    );
    for path in &summary.written {
        assert!(fs::read_to_string(path).unwrap().contains("<svg"));
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
    let columns: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["column"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(columns.len(), 9);
    assert!(columns.contains(&"Stress_Level".to_string()));
    assert!(!columns.contains(&"Occupation".to_string()));

    let document = fs::read_to_string(summary.document.unwrap()).unwrap();
    assert_eq!(document.matches("<section").count(), 7);
}

#[test]
fn test_explore_without_age_drops_one_chart() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture_without("Age", dir.path());
    let summary = explore::run(&input, &dir.path().join("out")).unwrap();

    assert_eq!(summary.written.len(), 6);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "stress_by_age");
    assert_eq!(
        summary.skipped[0].reason,
        SkipReason::MissingColumns(vec!["Age".to_string()])
    );
}

#[test]
fn test_report_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = report_config(fixture(), dir.path());
    let summary = smartphone::run(&config).unwrap();

    assert!(summary.skipped.is_empty(), "{:?}", summary.skipped);
    assert_eq!(summary.written.len(), 8);
    assert!(dir.path().join("charts/01_overview.svg").exists());
    assert!(dir.path().join("charts/08_stress_profiles.svg").exists());

    let document = fs::read_to_string(&config.output).unwrap();
    assert_eq!(document.matches("<section").count(), 8);
    assert!(document.contains("Smartphone Usage &amp; Stress Reduction Analysis"));
}

#[test]
fn test_report_without_gender_skips_one_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture_without("Gender", dir.path());
    let config = report_config(input, dir.path());
    let summary = smartphone::run(&config).unwrap();

    assert_eq!(summary.written.len(), 7);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "stress_by_gender");
    assert!(!dir.path().join("charts/05_stress_by_gender.svg").exists());
    assert!(dir.path().join("charts/06_occupation_radar.svg").exists());
}

#[test]
fn test_report_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = report_config(dir.path().join("absent.csv"), dir.path());
    let err = smartphone::run(&config).unwrap_err();
    assert!(err.downcast_ref::<DataSourceError>().is_some());
    assert!(!config.output.exists());
}

#[test]
fn test_weather_output_is_exact_and_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weather_results.txt");

    weather::run(&path).unwrap();
    let first = fs::read(&path).unwrap();
    weather::run(&path).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "Average High Temperature: 36.13°C\n\
         Median High Temperature: 38°C\n\
         Average Low Temperature: 18.13°C\n\
         Median Low Temperature: 18°C\n\
         Average Humidity: 16.07%\n\
         Median Humidity: 14%\n"
    );
}
