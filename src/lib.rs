//! Exploratory analysis of product-review exports.
//!
//! Pipeline: [`table::load_reviews`] → [`table::clean_reviews`] →
//! [`sentiment::score_reviews`] → [`analysis::analyze`] → [`render::render_charts`],
//! with [`insights::write_insights`] closing the console report.

pub mod analysis;
pub mod config;
pub mod error;
pub mod insights;
pub mod render;
pub mod review_analyzer;
pub mod sentiment;
pub mod table;

pub use config::{AnalyzerConfig, ChartOptions, ReviewSchema};
pub use error::{Result, ReviewError};
pub use review_analyzer::{AnalysisOutcome, analyze_reviews, review_analyzer_main};
