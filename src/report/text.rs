//! Fixed-format plain-text statistics.

use std::path::Path;

use crate::analysis::AggFunc;
use crate::analysis::column_values;
use crate::analysis::groupby::summarize;
use crate::error::AnalysisError;
use crate::output::write_text;
use crate::table::{Table, format_number};

/// How a value is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Exactly this many decimals.
    Fixed(usize),
    /// Integral values without decimals, others as-is.
    Natural,
}

impl Precision {
    fn format(self, value: f64) -> String {
        match self {
            Precision::Fixed(digits) => format!("{value:.digits$}"),
            Precision::Natural => format_number(value),
        }
    }
}

/// One `"{label}: {value}{unit}"` line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub label: String,
    pub column: String,
    pub func: AggFunc,
    pub precision: Precision,
    pub unit: String,
}

impl TextLine {
    pub fn mean(label: &str, column: &str, unit: &str) -> Self {
        TextLine::new(label, column, AggFunc::Mean, Precision::Fixed(2), unit)
    }

    pub fn median(label: &str, column: &str, unit: &str) -> Self {
        TextLine::new(label, column, AggFunc::Median, Precision::Natural, unit)
    }

    pub fn new(label: &str, column: &str, func: AggFunc, precision: Precision, unit: &str) -> Self {
        TextLine {
            label: label.to_string(),
            column: column.to_string(),
            func,
            precision,
            unit: unit.to_string(),
        }
    }

    fn render(&self, table: &Table) -> Result<String, AnalysisError> {
        let values = column_values(table, &self.column)?;
        let value = match summarize(&values, self.func) {
            Some(v) => self.precision.format(v),
            None => "n/a".to_string(),
        };
        Ok(format!("{}: {}{}", self.label, value, self.unit))
    }
}

/// Pre-declared list of statistic lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextTemplate {
    lines: Vec<TextLine>,
}

impl TextTemplate {
    pub fn new(lines: Vec<TextLine>) -> Self {
        TextTemplate { lines }
    }

    pub fn line(mut self, line: TextLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Renders every line, each terminated by a newline.
    pub fn render(&self, table: &Table) -> Result<String, AnalysisError> {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render(table)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Renders and overwrites `path`.
    pub fn write(&self, table: &Table, path: impl AsRef<Path>) -> anyhow::Result<String> {
        let text = self.render(table)?;
        write_text(path, &text)?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Scalar;

    fn table() -> Table {
        Table::from_records(
            [3.0, 1.0, 2.0, 2.0]
                .iter()
                .map(|v| vec![("v", Scalar::from(*v))]),
        )
        .unwrap()
    }

    #[test]
    fn test_precision() {
        assert_eq!(Precision::Fixed(2).format(36.1333), "36.13");
        assert_eq!(Precision::Fixed(2).format(5.0), "5.00");
        assert_eq!(Precision::Natural.format(38.0), "38");
        assert_eq!(Precision::Natural.format(18.5), "18.5");
    }

    #[test]
    fn test_render_lines_in_order() {
        let template = TextTemplate::default()
            .line(TextLine::mean("Average V", "v", "°C"))
            .line(TextLine::median("Median V", "v", "%"))
            .line(TextLine::new("Rows", "v", AggFunc::Count, Precision::Natural, ""));

        assert_eq!(
            template.render(&table()).unwrap(),
            "Average V: 2.00°C\nMedian V: 2%\nRows: 4\n"
        );
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let template = TextTemplate::new(vec![TextLine::mean("X", "nope", "")]);
        assert_eq!(
            template.render(&table()).unwrap_err(),
            AnalysisError::MissingColumn("nope".into())
        );
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale content that is longer than the report\n".repeat(10)).unwrap();

        let template = TextTemplate::new(vec![TextLine::median("Median V", "v", "")]);
        template.write(&table(), &path).unwrap();
        template.write(&table(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Median V: 2\n");
    }
}
