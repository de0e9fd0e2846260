//! Analyzer configuration: input/output locations, the column schema of the
//! review export, and the fixed chart parameters.

use std::path::PathBuf;

pub const DEFAULT_INPUT_FILE: &str = "reviews.tsv";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Maps each logical review field to its column name in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSchema {
    pub posted_date: String,
    pub review_text: String,
    pub translated_review_text: String,
    pub rating_value: String,
    pub product_id: String,
    pub language_code: String,
}

impl Default for ReviewSchema {
    fn default() -> Self {
        Self {
            posted_date: "postedDate".to_string(),
            review_text: "reviewText".to_string(),
            translated_review_text: "translation.reviewText".to_string(),
            rating_value: "ratingValue".to_string(),
            product_id: "productId".to_string(),
            language_code: "languageCode".to_string(),
        }
    }
}

impl ReviewSchema {
    /// All column names the loader requires, in schema order.
    pub fn required_columns(&self) -> [&str; 6] {
        [
            self.posted_date.as_str(),
            self.review_text.as_str(),
            self.translated_review_text.as_str(),
            self.rating_value.as_str(),
            self.product_id.as_str(),
            self.language_code.as_str(),
        ]
    }
}

/// Bucket counts and ranking sizes used by the charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub rating_bins: usize,
    pub sentiment_bins: usize,
    pub top_products: usize,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            rating_bins: 10,
            sentiment_bins: 20,
            top_products: 10,
            width: 1000,
            height: 600,
        }
    }
}

/// Everything one analyzer run needs.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub schema: ReviewSchema,
    pub charts: ChartOptions,
}

impl AnalyzerConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            schema: ReviewSchema::default(),
            charts: ChartOptions::default(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_DIR)
    }
}
