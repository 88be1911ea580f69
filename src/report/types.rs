//! Render-ready report artifacts.

use crate::analysis::{Aggregate, CorrelationMatrix, Pivot, Profile};

/// Visual form of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Bar,
    HorizontalBar,
    Line,
    Pie,
    GroupedBar,
    Radar,
    Heatmap,
}

/// One named sequence of values, aligned with [`Chart::categories`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Series {
            name: name.into(),
            values,
        }
    }

    pub fn dense(name: impl Into<String>, values: &[f64]) -> Self {
        Series::new(name, values.iter().copied().map(Some).collect())
    }
}

/// A single chart.
///
/// Bars, lines and pies use `categories` as labels; radar charts use them as
/// axes with one series per polygon; heatmaps use them for both axes with one
/// series per matrix row.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub shape: Shape,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub value_range: Option<(f64, f64)>,
}

impl Chart {
    pub fn new(shape: Shape, title: impl Into<String>) -> Self {
        Chart {
            shape,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            series: Vec::new(),
            value_range: None,
        }
    }

    /// Single-series chart of an aggregate, keeping its key order.
    pub fn from_aggregate(shape: Shape, title: impl Into<String>, agg: &Aggregate) -> Self {
        Chart {
            categories: agg.labels(),
            series: vec![Series::dense(agg.metric.clone(), &agg.values())],
            ..Chart::new(shape, title)
        }
    }

    /// Grouped bars of several aggregates sharing one key order.
    ///
    /// Categories come from the first aggregate; the others are aligned by label.
    pub fn from_aggregates(
        title: impl Into<String>,
        aggs: &[(&str, &Aggregate)],
    ) -> Self {
        let categories = aggs.first().map(|(_, a)| a.labels()).unwrap_or_default();
        let series = aggs
            .iter()
            .map(|(name, agg)| {
                Series::new(*name, categories.iter().map(|c| agg.get(c)).collect())
            })
            .collect();
        Chart {
            categories,
            series,
            ..Chart::new(Shape::GroupedBar, title)
        }
    }

    /// Grouped bars with one bar per pivot series inside each row key.
    pub fn from_pivot(title: impl Into<String>, pivot: &Pivot) -> Self {
        Chart {
            categories: pivot.row_keys.iter().map(|k| k.label()).collect(),
            series: pivot
                .series_keys
                .iter()
                .enumerate()
                .map(|(i, k)| Series::new(k.label(), pivot.series_values(i)))
                .collect(),
            ..Chart::new(Shape::GroupedBar, title)
        }
    }

    /// Grouped bars comparing profiles metric by metric.
    pub fn from_profiles(
        title: impl Into<String>,
        metrics: &[(&str, &str)],
        profiles: &[&Profile],
    ) -> Self {
        Chart {
            categories: metrics.iter().map(|(_, label)| label.to_string()).collect(),
            series: profiles
                .iter()
                .map(|p| {
                    Series::new(
                        p.label.clone(),
                        metrics.iter().map(|(column, _)| p.mean_of(column)).collect(),
                    )
                })
                .collect(),
            ..Chart::new(Shape::GroupedBar, title)
        }
    }

    pub fn heatmap(title: impl Into<String>, matrix: &CorrelationMatrix) -> Self {
        Chart {
            categories: matrix.columns.clone(),
            series: matrix
                .columns
                .iter()
                .zip(&matrix.values)
                .map(|(name, row)| Series::dense(name.clone(), row))
                .collect(),
            value_range: Some((-1.0, 1.0)),
            ..Chart::new(Shape::Heatmap, title)
        }
    }

    pub fn axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn range(mut self, lower: f64, upper: f64) -> Self {
        self.value_range = Some((lower, upper));
        self
    }

    /// All present values across every series.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
    }
}

/// A headline number on a cover page.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub value: String,
    pub label: String,
}

impl Tile {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Tile {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Tiles(Vec<Tile>),
    Panels(Vec<Chart>),
}

/// One page of a bundled document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: PageBody,
    pub notes: Vec<String>,
}

impl Page {
    pub fn panels(title: impl Into<String>, charts: Vec<Chart>) -> Self {
        Page {
            title: title.into(),
            subtitle: None,
            body: PageBody::Panels(charts),
            notes: Vec::new(),
        }
    }

    pub fn tiles(title: impl Into<String>, tiles: Vec<Tile>) -> Self {
        Page {
            title: title.into(),
            subtitle: None,
            body: PageBody::Tiles(tiles),
            notes: Vec::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl From<Chart> for Page {
    fn from(chart: Chart) -> Self {
        Page::panels(chart.title.clone(), vec![chart])
    }
}
