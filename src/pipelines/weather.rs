//! Mean and median statistics over a fixed weather sample.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::error::DataSourceError;
use crate::report::{TextLine, TextTemplate};
use crate::table::{Scalar, Table};

/// `(date, high °C, low °C, humidity %)` for 25 Feb to 11 Mar.
const SAMPLE: [(&str, i32, i32, i32); 15] = [
    ("25 Feb", 34, 19, 21),
    ("26 Feb", 33, 19, 23),
    ("27 Feb", 32, 18, 32),
    ("28 Feb", 33, 18, 27),
    ("1 Mar", 34, 16, 22),
    ("2 Mar", 34, 16, 23),
    ("3 Mar", 37, 19, 17),
    ("4 Mar", 38, 19, 8),
    ("5 Mar", 39, 19, 11),
    ("6 Mar", 38, 18, 7),
    ("7 Mar", 38, 18, 14),
    ("8 Mar", 38, 18, 9),
    ("9 Mar", 38, 18, 10),
    ("10 Mar", 38, 18, 8),
    ("11 Mar", 38, 19, 9),
];

pub fn sample() -> Result<Table, DataSourceError> {
    Table::from_records(SAMPLE.iter().map(|&(date, high, low, humidity)| {
        [
            ("date", Scalar::from(date)),
            ("temp_high", Scalar::from(high)),
            ("temp_low", Scalar::from(low)),
            ("humidity", Scalar::from(humidity)),
        ]
    }))
}

pub fn template() -> TextTemplate {
    TextTemplate::new(vec![
        TextLine::mean("Average High Temperature", "temp_high", "°C"),
        TextLine::median("Median High Temperature", "temp_high", "°C"),
        TextLine::mean("Average Low Temperature", "temp_low", "°C"),
        TextLine::median("Median Low Temperature", "temp_low", "°C"),
        TextLine::mean("Average Humidity", "humidity", "%"),
        TextLine::median("Median Humidity", "humidity", "%"),
    ])
}

/// Writes the statistics to `output`, replacing any previous contents.
#[tracing::instrument(skip_all, fields(output = %output.display()))]
pub fn run(output: &Path) -> Result<String> {
    let table = sample()?;
    let text = template().write(&table, output)?;
    info!(lines = text.lines().count(), "Weather statistics written");
    Ok(text)
}
