//! Loading and cleaning of the review table.
//!
//! The export is a tab-separated file with a header row. Loading resolves the
//! schema's columns by name and keeps every value as text except the rating;
//! cleaning parses the posting date and fills missing review text with `""`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::config::ReviewSchema;
use crate::error::{Result, ReviewError};

/// Cell values read as missing, the same set dataframe readers treat as NA.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// One review as read from the file, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReview {
    pub posted_date: Option<String>,
    pub review_text: Option<String>,
    pub translated_review_text: Option<String>,
    pub rating_value: Option<f64>,
    pub product_id: Option<String>,
    pub language_code: Option<String>,
}

/// A cleaned review: the date is parsed and both text fields are present.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub posted_date: NaiveDateTime,
    pub review_text: String,
    pub translated_review_text: String,
    pub rating_value: Option<f64>,
    pub product_id: Option<String>,
    pub language_code: Option<String>,
}

/// A cleaned review with the polarity of both text fields attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredReview {
    pub review: Review,
    pub sentiment: f64,
    pub translated_sentiment: f64,
}

impl ScoredReview {
    /// Per-row weight summed by the monthly aggregation.
    pub const REVIEW_COUNT: u64 = 1;
}

/// Positions of the schema columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    posted_date: usize,
    review_text: usize,
    translated_review_text: usize,
    rating_value: usize,
    product_id: usize,
    language_code: usize,
}

impl ColumnIndex {
    /// Locate every schema column in `headers`, or return the names that are absent.
    fn resolve(
        headers: &StringRecord,
        schema: &ReviewSchema,
    ) -> std::result::Result<Self, Vec<String>> {
        let names = schema.required_columns();
        let positions = names.map(|name| headers.iter().position(|h| h.trim() == name));

        match positions {
            [
                Some(posted_date),
                Some(review_text),
                Some(translated_review_text),
                Some(rating_value),
                Some(product_id),
                Some(language_code),
            ] => Ok(Self {
                posted_date,
                review_text,
                translated_review_text,
                rating_value,
                product_id,
                language_code,
            }),
            _ => Err(names
                .iter()
                .zip(positions)
                .filter(|(_, position)| position.is_none())
                .map(|(name, _)| name.to_string())
                .collect()),
        }
    }
}

fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .filter(|value| !NA_VALUES.contains(&value.trim()))
        .map(str::to_string)
}

/// Reads the tab-separated review export at `path`.
///
/// Fails with [`ReviewError::DataLoad`] when the file cannot be opened, a record is
/// malformed, a required column is absent, or a rating is not numeric. The file is
/// closed before this function returns.
pub fn load_reviews(path: impl AsRef<Path>, schema: &ReviewSchema) -> Result<Vec<RawReview>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ReviewError::data_load(path, e.to_string()))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| ReviewError::data_load(path, e.to_string()))?
        .clone();

    let columns = ColumnIndex::resolve(&headers, schema).map_err(|missing| {
        ReviewError::data_load(
            path,
            format!("missing required column(s): {}", missing.join(", ")),
        )
    })?;

    let mut reviews = Vec::new();
    for (row_index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ReviewError::data_load(path, e.to_string()))?;
        let row = row_index + 1;

        let rating_value = match cell(&record, columns.rating_value) {
            Some(text) => Some(text.trim().parse::<f64>().map_err(|_| {
                ReviewError::data_load(
                    path,
                    format!(
                        "row {}: {} value {:?} is not numeric",
                        row, schema.rating_value, text
                    ),
                )
            })?),
            None => None,
        };

        reviews.push(RawReview {
            // kept as written so a rejected date is reported verbatim
            posted_date: record.get(columns.posted_date).map(str::to_string),
            review_text: cell(&record, columns.review_text),
            translated_review_text: cell(&record, columns.translated_review_text),
            rating_value,
            product_id: cell(&record, columns.product_id).map(|id| id.trim().to_string()),
            language_code: cell(&record, columns.language_code)
                .map(|code| code.trim().to_string()),
        });
    }

    if reviews.is_empty() {
        warn!("{} contains a header but no review rows", path.display());
    }
    info!("Loaded {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Parses a posting date in any of the accepted layouts. Offsets are dropped and
/// the wall-clock time kept; date-only values become midnight.
pub fn parse_posted_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.naive_local());
    }
    if let Ok(stamp) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(stamp.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(stamp);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Converts raw rows into cleaned reviews.
///
/// Every posting date must parse; the first failure aborts with
/// [`ReviewError::Parse`]. Missing review text becomes an empty string. No other
/// column is touched.
pub fn clean_reviews(raw: Vec<RawReview>, schema: &ReviewSchema) -> Result<Vec<Review>> {
    let reviews = raw
        .into_iter()
        .enumerate()
        .map(|(row_index, raw)| {
            let date_text = raw.posted_date.unwrap_or_default();
            let posted_date = parse_posted_date(&date_text).ok_or_else(|| ReviewError::Parse {
                row: row_index + 1,
                column: schema.posted_date.clone(),
                value: date_text.clone(),
            })?;

            Ok(Review {
                posted_date,
                review_text: raw.review_text.unwrap_or_default(),
                translated_review_text: raw.translated_review_text.unwrap_or_default(),
                rating_value: raw.rating_value,
                product_id: raw.product_id,
                language_code: raw.language_code,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Cleaned {} reviews", reviews.len());
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "postedDate\treviewText\ttranslation.reviewText\tratingValue\tproductId\tlanguageCode";

    fn write_tsv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_reads_all_columns() {
        let file = write_tsv(&[
            HEADER,
            "2023-01-05\tGreat mask\tОтличная маска\t50\t101\ten",
            "2023-01-20\t\t\t40\t102\tru",
        ]);

        let raw = load_reviews(file.path(), &ReviewSchema::default()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].review_text.as_deref(), Some("Great mask"));
        assert_eq!(raw[0].rating_value, Some(50.0));
        assert_eq!(raw[0].product_id.as_deref(), Some("101"));
        assert_eq!(raw[1].review_text, None);
        assert_eq!(raw[1].translated_review_text, None);
        assert_eq!(raw[1].language_code.as_deref(), Some("ru"));
    }

    #[test]
    fn test_load_ignores_extra_columns_and_order() {
        let file = write_tsv(&[
            "languageCode\textra\tproductId\tratingValue\ttranslation.reviewText\treviewText\tpostedDate",
            "en\tx\tA-1\t45\tnice\tnice\t2023-03-01",
        ]);

        let raw = load_reviews(file.path(), &ReviewSchema::default()).unwrap();
        assert_eq!(raw[0].language_code.as_deref(), Some("en"));
        assert_eq!(raw[0].product_id.as_deref(), Some("A-1"));
        assert_eq!(raw[0].posted_date.as_deref(), Some("2023-03-01"));
    }

    #[test]
    fn test_load_missing_file_is_data_load_error() {
        let err = load_reviews("definitely/not/here.tsv", &ReviewSchema::default()).unwrap_err();
        assert!(matches!(err, ReviewError::DataLoad { .. }));
    }

    #[test]
    fn test_load_missing_column_is_data_load_error() {
        let file = write_tsv(&[
            "postedDate\treviewText\tratingValue\tproductId",
            "2023-01-05\tok\t50\t1",
        ]);

        let err = load_reviews(file.path(), &ReviewSchema::default()).unwrap_err();
        match err {
            ReviewError::DataLoad { reason, .. } => {
                assert!(reason.contains("translation.reviewText"));
                assert!(reason.contains("languageCode"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_ragged_row_is_data_load_error() {
        let file = write_tsv(&[HEADER, "2023-01-05\tok\tok\t50"]);
        let err = load_reviews(file.path(), &ReviewSchema::default()).unwrap_err();
        assert!(matches!(err, ReviewError::DataLoad { .. }));
    }

    #[test]
    fn test_load_non_numeric_rating_is_data_load_error() {
        let file = write_tsv(&[HEADER, "2023-01-05\tok\tok\tfive\t1\ten"]);
        let err = load_reviews(file.path(), &ReviewSchema::default()).unwrap_err();
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_clean_fills_missing_text() {
        let file = write_tsv(&[
            HEADER,
            "2023-01-05\tNA\t\t50\t1\ten",
            "2023-01-06\tkeep me\tnull\t50\t1\ten",
        ]);
        let schema = ReviewSchema::default();
        let reviews = clean_reviews(load_reviews(file.path(), &schema).unwrap(), &schema).unwrap();

        assert_eq!(reviews[0].review_text, "");
        assert_eq!(reviews[0].translated_review_text, "");
        assert_eq!(reviews[1].review_text, "keep me");
        assert_eq!(reviews[1].translated_review_text, "");
    }

    #[test]
    fn test_clean_rejects_unparseable_date() {
        let file = write_tsv(&[
            HEADER,
            "2023-01-05\ta\ta\t50\t1\ten",
            "last tuesday\ta\ta\t50\t1\ten",
        ]);
        let schema = ReviewSchema::default();
        let err = clean_reviews(load_reviews(file.path(), &schema).unwrap(), &schema).unwrap_err();

        match err {
            ReviewError::Parse { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "postedDate");
                assert_eq!(value, "last tuesday");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_clean_reports_na_date_as_written() {
        let file = write_tsv(&[HEADER, "NaN\ta\ta\t50\t1\ten"]);
        let schema = ReviewSchema::default();
        let raw = load_reviews(file.path(), &schema).unwrap();
        assert_eq!(raw[0].posted_date.as_deref(), Some("NaN"));

        match clean_reviews(raw, &schema).unwrap_err() {
            ReviewError::Parse { value, .. } => assert_eq!(value, "NaN"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_reports_every_missing_column() {
        let headers = StringRecord::from(vec!["reviewText", "postedDate", "productId"]);
        let missing = ColumnIndex::resolve(&headers, &ReviewSchema::default()).unwrap_err();
        assert_eq!(
            missing,
            vec!["translation.reviewText", "ratingValue", "languageCode"]
        );

        let headers = StringRecord::from(vec![
            "languageCode",
            "productId",
            "ratingValue",
            "translation.reviewText",
            "reviewText",
            "postedDate",
        ]);
        let index = ColumnIndex::resolve(&headers, &ReviewSchema::default()).unwrap();
        assert_eq!(index.language_code, 0);
        assert_eq!(index.posted_date, 5);
        assert_eq!(index.translated_review_text, 3);
    }

    #[test]
    fn test_clean_rejects_missing_date() {
        let raw = vec![RawReview {
            posted_date: None,
            review_text: None,
            translated_review_text: None,
            rating_value: None,
            product_id: None,
            language_code: None,
        }];
        let err = clean_reviews(raw, &ReviewSchema::default()).unwrap_err();
        assert!(matches!(err, ReviewError::Parse { row: 1, .. }));
    }

    #[test]
    fn test_parse_posted_date_layouts() {
        let jan5 = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();

        assert_eq!(parse_posted_date("2023-01-05").unwrap().date(), jan5);
        assert_eq!(parse_posted_date(" 2023/01/05 ").unwrap().date(), jan5);
        assert_eq!(parse_posted_date("01/05/2023").unwrap().date(), jan5);

        let stamp = parse_posted_date("2023-01-05T13:45:10.250").unwrap();
        assert_eq!(stamp.date(), jan5);
        assert_eq!(stamp.hour(), 13);

        let stamp = parse_posted_date("2023-01-05 08:30:00").unwrap();
        assert_eq!(stamp.minute(), 30);

        // Offset is dropped, wall-clock time kept.
        let stamp = parse_posted_date("2023-01-31T23:30:00+03:00").unwrap();
        assert_eq!(stamp.date(), NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        assert_eq!(stamp.hour(), 23);

        assert!(parse_posted_date("").is_none());
        assert!(parse_posted_date("2023-13-40").is_none());
    }
}
