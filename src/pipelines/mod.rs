//! End-to-end runs: load, aggregate, render, write.

pub mod explore;
pub mod smartphone;
pub mod weather;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::output::write_svg;
use crate::report::{Outcome, Render, ReportDocument, SkipReason, Skipped};

/// Column names of the smartphone usage dataset.
pub mod columns {
    pub const OCCUPATION: &str = "Occupation";
    pub const GENDER: &str = "Gender";
    pub const AGE: &str = "Age";
    pub const PHONE: &str = "Daily_Phone_Hours";
    pub const SOCIAL: &str = "Social_Media_Hours";
    pub const STRESS: &str = "Stress_Level";
    pub const CAFFEINE: &str = "Caffeine_Intake_Cups";
    pub const SLEEP: &str = "Sleep_Hours";
    pub const WEEKEND: &str = "Weekend_Screen_Time_Hours";
}

/// What a pipeline run wrote and what it skipped.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
    pub document: Option<PathBuf>,
}

/// Renders every produced artifact, writes it as `<dir>/<NN_name>.svg` and
/// appends it to `document`, in plan order.
///
/// A render failure skips that artifact only; write failures abort.
pub(crate) fn publish<T: Render>(
    outcome: Outcome<T>,
    charts_dir: &Path,
    document: &mut ReportDocument,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        skipped: outcome.skipped,
        ..RunSummary::default()
    };

    for produced in outcome.produced {
        let svg = match produced.artifact.to_svg() {
            Ok(svg) => svg,
            Err(e) => {
                error!(artifact = produced.name, error = %e, "Render failed, artifact skipped");
                summary.skipped.push(Skipped {
                    name: produced.name,
                    reason: SkipReason::Failed(format!("{e:#}")),
                });
                continue;
            }
        };

        let path = charts_dir.join(format!("{}.svg", produced.file_stem()));
        write_svg(&path, &svg)?;
        document.add_page(produced.artifact.title(), &svg)?;
        info!(artifact = produced.name, path = %path.display(), "Artifact written");
        summary.written.push(path);
    }

    Ok(summary)
}
