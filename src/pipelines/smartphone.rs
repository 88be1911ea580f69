//! Eight-page smartphone usage & stress report.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use tracing::info;

use super::columns::{CAFFEINE, GENDER, OCCUPATION, PHONE, SLEEP, SOCIAL, STRESS, WEEKEND};
use super::{RunSummary, publish};
use crate::analysis::utility::mean;
use crate::analysis::{
    AggFunc, Aggregate, BandTable, Grouping, KeyOrder, Profile, aggregate, column_values,
    distribution, pivot, profile,
};
use crate::config::ReportConfig;
use crate::error::AnalysisError;
use crate::loader::load_csv;
use crate::report::{Chart, Page, Plan, ReportDocument, Series, Shape, Tile};
use crate::table::Table;

const TITLE: &str = "Smartphone Usage & Stress Reduction Analysis";

/// Habit metrics compared between the highest and lowest stress bands.
const HABITS: [(&str, &str); 4] = [
    (PHONE, "Phone Hours"),
    (SOCIAL, "Social Media (hrs)"),
    (SLEEP, "Sleep Hours"),
    (CAFFEINE, "Caffeine (cups)"),
];

/// Everything the page builders read besides the table.
#[derive(Debug)]
pub struct ReportSetup<'a> {
    pub config: &'a ReportConfig,
    pub bands: BandTable,
    pub occupations: KeyOrder,
    pub genders: KeyOrder,
    pub generated: DateTime<Local>,
}

impl<'a> ReportSetup<'a> {
    pub fn new(config: &'a ReportConfig, generated: DateTime<Local>) -> Result<Self> {
        let bands = BandTable::new(config.stress_bands.clone()).context("invalid stress bands")?;
        Ok(ReportSetup {
            config,
            bands,
            occupations: KeyOrder::Fixed(config.occupations.clone()),
            genders: KeyOrder::Fixed(config.genders.clone()),
            generated,
        })
    }

    fn mean_by_occupation(&self, table: &Table, metric: &str) -> Result<Aggregate, AnalysisError> {
        aggregate(
            table,
            &Grouping::Column(OCCUPATION),
            metric,
            AggFunc::Mean,
            &self.occupations,
        )
    }

    fn mean_by_stress_band(&self, table: &Table, metric: &str) -> Result<Aggregate, AnalysisError> {
        aggregate(
            table,
            &Grouping::Banded {
                column: STRESS,
                bands: &self.bands,
            },
            metric,
            AggFunc::Mean,
            &KeyOrder::Natural,
        )
    }
}

/// Formats `n` with comma thousands separators.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn extremes(agg: &Aggregate) -> Option<((String, f64), (String, f64))> {
    let max = agg.entries.iter().max_by(|a, b| a.1.total_cmp(&b.1))?;
    let min = agg.entries.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
    Some(((max.0.label(), max.1), (min.0.label(), min.1)))
}

fn cover(setup: &ReportSetup<'_>, table: &Table) -> Result<Page> {
    let column_mean = |column: &str| -> Result<Option<f64>> {
        if !table.has_column(column) {
            return Ok(None);
        }
        Ok(mean(&column_values(table, column)?))
    };

    let respondents = thousands(table.len());
    let mut tiles = vec![Tile::new(respondents.clone(), "Respondents")];
    let mut occupations = None;
    if table.has_column(OCCUPATION) {
        let n = distribution(table, OCCUPATION, &KeyOrder::Natural)?.len();
        occupations = Some(n);
        tiles.push(Tile::new(n.to_string(), "Occupations"));
    }
    for (column, label, unit) in [
        (PHONE, "Avg Phone / Day", "h"),
        (STRESS, "Avg Stress Level", "/10"),
        (SOCIAL, "Social Media / Day", "h"),
        (SLEEP, "Avg Sleep", "h"),
    ] {
        if let Some(v) = column_mean(column)? {
            tiles.push(Tile::new(format!("{v:.1}{unit}"), label));
        }
    }

    let mut subtitle = format!("{respondents} respondents");
    if let Some(n) = occupations {
        subtitle.push_str(&format!("  ·  {n} occupations"));
    }
    subtitle.push_str(&format!("  ·  {} variables tracked", table.columns().len()));

    Ok(Page::tiles(TITLE, tiles)
        .subtitle(subtitle)
        .note(format!("Generated {}", setup.generated.format("%Y-%m-%d %H:%M"))))
}

/// The eight report pages, in output order.
pub fn plan<'a>(setup: &'a ReportSetup<'a>) -> Plan<'a, Page> {
    let radar_columns: Vec<&str> = std::iter::once(OCCUPATION)
        .chain(setup.config.radar.iter().map(|a| a.column.as_str()))
        .collect();

    Plan::new()
        .step("overview", &[], move |t| cover(setup, t))
        .step("occupation_share", &[OCCUPATION, PHONE], move |t| {
            let share = distribution(t, OCCUPATION, &setup.occupations)?;
            let phone = setup.mean_by_occupation(t, PHONE)?;
            Ok(Page::panels(
                "Who Uses Their Phone the Most?",
                vec![
                    Chart::from_aggregate(Shape::Pie, "Respondent Share by Occupation", &share),
                    Chart::from_aggregate(
                        Shape::HorizontalBar,
                        "Avg Daily Phone Hours by Occupation",
                        &phone,
                    )
                    .axes("Occupation", "Average Daily Phone Hours"),
                ],
            )
            .subtitle("Dataset composition and average daily phone hours by occupation"))
        })
        .step("phone_vs_social", &[OCCUPATION, PHONE, SOCIAL], move |t| {
            let phone = setup.mean_by_occupation(t, PHONE)?;
            let social = setup.mean_by_occupation(t, SOCIAL)?;
            let mut page = Page::from(
                Chart::from_aggregates(
                    "Social Media Hours vs Daily Phone Hours",
                    &[("Daily Phone Hours", &phone), ("Social Media Hours", &social)],
                )
                .axes("Occupation", "Hours per Day"),
            );
            if let Some(((top, hours), _)) = extremes(&social) {
                page = page.subtitle(format!(
                    "{top} spend the most time on social media ({hours:.2} hrs/day)"
                ));
            }
            Ok(page)
        })
        .step("stress_levels", &[OCCUPATION, STRESS], move |t| {
            let by_occupation = setup.mean_by_occupation(t, STRESS)?;
            let spread = distribution(t, STRESS, &KeyOrder::Natural)?;
            let mut page = Page::panels(
                "Stress Level Analysis",
                vec![
                    Chart::from_aggregate(Shape::Bar, "Avg Stress by Occupation", &by_occupation)
                        .axes("Occupation", "Average Stress Level (1–10)"),
                    Chart::from_aggregate(Shape::Bar, "Stress Distribution, All Respondents", &spread)
                        .axes("Stress Level", "Number of Respondents"),
                ],
            );
            if let Some(((high, hv), (low, lv))) = extremes(&by_occupation) {
                page = page.subtitle(format!(
                    "{high} carry the highest stress ({hv:.2}); {low} the lowest ({lv:.2})"
                ));
            }
            Ok(page)
        })
        .step("stress_by_gender", &[OCCUPATION, GENDER, STRESS], move |t| {
            let grid = pivot(
                t,
                OCCUPATION,
                GENDER,
                STRESS,
                AggFunc::Mean,
                &setup.occupations,
                &setup.genders,
            )?;
            Ok(Page::from(
                Chart::from_pivot("Stress Level by Occupation & Gender", &grid)
                    .axes("Occupation", "Average Stress Level"),
            ))
        })
        .step("occupation_radar", &radar_columns, move |t| {
            let axes = &setup.config.radar;
            let per_axis = axes
                .iter()
                .map(|axis| setup.mean_by_occupation(t, &axis.column))
                .collect::<Result<Vec<_>, _>>()?;
            let Some(first) = per_axis.first() else {
                bail!("no radar axes configured");
            };

            let series = first
                .labels()
                .into_iter()
                .map(|occupation| {
                    let values = axes
                        .iter()
                        .zip(&per_axis)
                        .map(|(axis, agg)| agg.get(&occupation).map(|v| axis.normalize(v)))
                        .collect();
                    Series::new(occupation, values)
                })
                .collect();

            let chart = Chart {
                categories: axes.iter().map(|a| a.label.clone()).collect(),
                series,
                ..Chart::new(Shape::Radar, "Multi-Metric Radar: Occupation Profiles")
            }
            .range(0.0, 10.0);
            let names: Vec<&str> = axes.iter().map(|a| a.label.as_str()).collect();
            Ok(Page::from(chart).subtitle(format!("Normalized comparison of {}", names.join(", "))))
        })
        .step(
            "habits_by_stress_group",
            &[OCCUPATION, CAFFEINE, SLEEP, STRESS, PHONE, WEEKEND],
            move |t| {
                let caffeine = setup.mean_by_occupation(t, CAFFEINE)?;
                let sleep = setup.mean_by_occupation(t, SLEEP)?;
                let weekday = setup.mean_by_stress_band(t, PHONE)?;
                let weekend = setup.mean_by_stress_band(t, WEEKEND)?;
                Ok(Page::panels(
                    "Caffeine, Sleep & Screen Time by Stress Group",
                    vec![
                        Chart::from_aggregates(
                            "Caffeine vs Sleep by Occupation",
                            &[("Caffeine (cups)", &caffeine), ("Sleep (hrs)", &sleep)],
                        )
                        .axes("Occupation", "Average Value"),
                        Chart::from_aggregates(
                            "Weekday vs Weekend Screen Time by Stress Group",
                            &[("Weekday Phone", &weekday), ("Weekend Screen", &weekend)],
                        )
                        .axes("Stress Group", "Average Hours")
                        .range(5.0, 10.0),
                    ],
                ))
            },
        )
        .step("stress_profiles", &[STRESS, PHONE, SOCIAL, SLEEP, CAFFEINE], move |t| {
            let bands = setup.bands.bands();
            let (Some(low), Some(high)) = (bands.first(), bands.last()) else {
                bail!("stress band table is empty");
            };
            let metrics = HABITS.map(|(column, _)| column);
            let high = profile(t, STRESS, high, &metrics)?;
            let low = profile(t, STRESS, low, &metrics)?;

            let chart = Chart::from_profiles(
                "High vs Low Stress: Habit Comparison",
                &HABITS,
                &[&high, &low],
            )
            .axes("Habit", "Average Value");
            let page = Page::from(chart)
                .subtitle(format!(
                    "{} respondents in {}, {} in {}",
                    thousands(high.rows),
                    high.label,
                    thousands(low.rows),
                    low.label
                ))
                .note(profile_note(&high, &low));
            Ok(setup
                .config
                .recommendations
                .iter()
                .fold(page, |page, rec| page.note(rec.line())))
        })
}

/// Footnote for the high/low comparison: names the largest relative gap, or
/// notes that the profiles are near-identical.
fn profile_note(high: &Profile, low: &Profile) -> String {
    let widest = HABITS
        .iter()
        .filter_map(|(column, label)| {
            let (h, l) = (high.mean_of(column)?, low.mean_of(column)?);
            let scale = h.abs().max(l.abs());
            (scale > 0.0).then(|| (*label, h, l, (h - l).abs() / scale))
        })
        .max_by(|a, b| a.3.total_cmp(&b.3));

    match widest {
        Some((label, h, l, gap)) if gap >= 0.05 => format!(
            "★  Largest difference: {label} ({h:.2} vs {l:.2})."
        ),
        _ => "★  Near-identical profiles: stress reduction requires holistic lifestyle changes, \
              not just screen-time reduction."
            .to_string(),
    }
}

/// Loads the configured dataset and writes the document plus one SVG per page.
#[tracing::instrument(skip_all, fields(input = %config.input.display(), output = %config.output.display()))]
pub fn run(config: &ReportConfig) -> Result<RunSummary> {
    let setup = ReportSetup::new(config, Local::now())?;
    let table = load_csv(&config.input)?;
    info!(rows = table.len(), columns = table.columns().len(), "Dataset loaded for report");

    let outcome = plan(&setup).run(&table);

    let mut document = ReportDocument::create(&config.output, TITLE, setup.generated)?;
    let mut result = publish(outcome, &config.charts_dir, &mut document)?;
    result.document = Some(document.finish()?);

    info!(
        pages = result.written.len(),
        skipped = result.skipped.len(),
        "Report finished"
    );
    Ok(result)
}
