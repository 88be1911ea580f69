pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipelines;
pub mod report;
pub mod table;
