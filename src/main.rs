//! Product Review Analyzer - Main Application
//!
//! Entry point for the review analyzer. It hands over to
//! `review_analyzer_main`, which parses the command line and runs the pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage (reads reviews.tsv, writes charts to "reports")
//! $ cargo run --release
//!
//! # With custom input and output directory
//! $ cargo run --release -- path/to/reviews.tsv custom/output/dir
//! ```

use review_analyzer_rust::review_analyzer_main;

/// call from module
fn main() -> anyhow::Result<()> {
    review_analyzer_main()
}
