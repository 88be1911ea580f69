//! Report artifacts and the sinks they are written to.

pub mod chart;
pub mod document;
pub mod plan;
pub mod text;
pub mod types;

pub use chart::{CHART_SIZE, PAGE_SIZE, Render, render_chart, render_page};
pub use document::ReportDocument;
pub use plan::{Outcome, Plan, Produced, SkipReason, Skipped};
pub use text::{Precision, TextLine, TextTemplate};
pub use types::{Chart, Page, PageBody, Series, Shape, Tile};
