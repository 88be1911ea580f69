use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::bands::{Band, default_stress_bands};

/// One axis of the occupation radar chart.
///
/// Values are normalised to `0..=10` with `(v - min) / (max - min) * 10`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxis {
    pub column: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl RadarAxis {
    fn new(column: &str, label: &str, min: f64, max: f64) -> Self {
        RadarAxis {
            column: column.to_string(),
            label: label.to_string(),
            min,
            max,
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min) * 10.0).clamp(0.0, 10.0)
    }
}

/// Advice for one audience, printed under the high/low stress comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub audience: String,
    pub advice: String,
}

impl Recommendation {
    fn new(audience: &str, advice: &str) -> Self {
        Recommendation {
            audience: audience.to_string(),
            advice: advice.to_string(),
        }
    }

    /// One footnote line: `Audience: advice`.
    pub fn line(&self) -> String {
        format!("{}: {}", self.audience, self.advice)
    }
}

/// Settings for the smartphone usage & stress report.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "input": "data/Smartphone_Usage_Productivity_Dataset_50000.csv",
///   "output": "smartphone_stress_analysis.html",
///   "occupations": ["Business Owner", "Freelancer", "Professional", "Student"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub charts_dir: PathBuf,
    pub occupations: Vec<String>,
    pub genders: Vec<String>,
    pub stress_bands: Vec<Band>,
    pub radar: Vec<RadarAxis>,
    pub recommendations: Vec<Recommendation>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input: PathBuf::from("data/Smartphone_Usage_Productivity_Dataset_50000.csv"),
            output: PathBuf::from("smartphone_stress_analysis.html"),
            charts_dir: PathBuf::from("charts"),
            occupations: ["Business Owner", "Freelancer", "Professional", "Student"]
                .map(String::from)
                .to_vec(),
            genders: ["Female", "Male", "Other"].map(String::from).to_vec(),
            stress_bands: default_stress_bands(),
            radar: vec![
                RadarAxis::new("Daily_Phone_Hours", "Phone Hours", 0.0, 10.0),
                RadarAxis::new("Social_Media_Hours", "Social Media", 0.0, 10.0),
                RadarAxis::new("Stress_Level", "Stress", 1.0, 10.0),
                RadarAxis::new("Caffeine_Intake_Cups", "Caffeine", 0.0, 6.0),
                RadarAxis::new("Sleep_Hours", "Sleep", 4.0, 10.0),
            ],
            recommendations: vec![
                Recommendation::new(
                    "Students",
                    "focus on sleep consistency and structured study breaks; limit weekend screens to 5 hrs.",
                ),
                Recommendation::new(
                    "Business Owners",
                    "set a 9 PM digital cutoff and no-phone work blocks to protect deep focus time.",
                ),
                Recommendation::new(
                    "Freelancers",
                    "swap afternoon caffeine for water and batch social media checks.",
                ),
                Recommendation::new(
                    "All Groups",
                    "a 4-hour Sunday digital detox is the highest-impact stress recovery habit.",
                ),
            ],
        }
    }
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path`; absent fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
