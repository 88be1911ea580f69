//! Groupwise aggregation over a [`Table`](crate::table::Table).
//!
//! This module groups rows by a categorical column or by bands of a
//! continuous column, summarises a metric per group (mean, median, count),
//! builds two-level pivots and filtered profiles, and computes correlation
//! matrices and descriptive summaries.

pub mod bands;
pub mod correlation;
pub mod groupby;
pub mod summary;
pub mod types;
pub mod utility;

pub use bands::{Band, BandTable};
pub use correlation::correlation_matrix;
pub use groupby::{Grouping, aggregate, column_values, distribution, pivot, profile};
pub use summary::describe;
pub use types::{
    AggFunc, Aggregate, ColumnSummary, CorrelationMatrix, GroupKey, KeyOrder, Pivot, Profile,
};
