//! Read-only aggregations over the scored review table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Datelike;
use tracing::{info, warn};

use crate::config::{ChartOptions, ReviewSchema};
use crate::table::ScoredReview;

/// Descriptive statistics for one numeric column. Undefined values are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Linear interpolation between the closest ranks of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

/// Count, mean, sample standard deviation, min, quartiles and max of `values`.
///
/// The standard deviation uses `n - 1` and is `NaN` below two values.
pub fn calculate_statistics(column: &str, values: &[f64]) -> Statistics {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = if count == 0 {
        f64::NAN
    } else {
        sorted.iter().sum::<f64>() / count as f64
    };

    let std_dev = if count < 2 {
        f64::NAN
    } else {
        let variance = sorted
            .iter()
            .map(|&x| {
                let diff = x - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;
        variance.sqrt()
    };

    Statistics {
        column: column.to_string(),
        count,
        mean,
        std_dev,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Statistics for the rating and both sentiment columns. The per-row review count
/// only feeds the monthly buckets and is not described.
pub fn describe(reviews: &[ScoredReview], schema: &ReviewSchema) -> Vec<Statistics> {
    let ratings: Vec<f64> = reviews.iter().filter_map(|r| r.review.rating_value).collect();
    let sentiment: Vec<f64> = reviews.iter().map(|r| r.sentiment).collect();
    let translated: Vec<f64> = reviews.iter().map(|r| r.translated_sentiment).collect();

    vec![
        calculate_statistics(&schema.rating_value, &ratings),
        calculate_statistics("sentiment", &sentiment),
        calculate_statistics("translated_sentiment", &translated),
    ]
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Reviews posted in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyCount {
    pub month: YearMonth,
    pub count: u64,
}

/// Sums the per-row review count in calendar-month buckets.
///
/// The series runs from the earliest to the latest month present; months with no
/// reviews are included with a count of zero.
pub fn monthly_review_counts(reviews: &[ScoredReview]) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for review in reviews {
        let date = review.review.posted_date.date();
        *buckets.entry(YearMonth::new(date.year(), date.month())).or_insert(0) +=
            ScoredReview::REVIEW_COUNT;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut month = first;
    while month <= last {
        series.push(MonthlyCount {
            month,
            count: buckets.get(&month).copied().unwrap_or(0),
        });
        month = month.next();
    }
    series
}

/// How often a product was reviewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCount {
    pub product_id: String,
    pub count: usize,
}

/// The `limit` most reviewed products, most frequent first.
///
/// Products with equal counts keep the order in which they first appear in the
/// input. Rows without a product id are not counted.
pub fn top_products(reviews: &[ScoredReview], limit: usize) -> Vec<ProductCount> {
    let mut counts: Vec<ProductCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for product_id in reviews.iter().filter_map(|r| r.review.product_id.as_deref()) {
        match positions.get(product_id) {
            Some(&index) => counts[index].count += 1,
            None => {
                positions.insert(product_id, counts.len());
                counts.push(ProductCount {
                    product_id: product_id.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Mean of some value for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageMean {
    pub language: String,
    pub mean: f64,
}

/// Descending order with `NaN` last.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Groups rows by language code and averages `value` per group, highest first.
///
/// Every language present appears once; missing values are skipped, and a group
/// with no values at all gets a `NaN` mean sorted to the end. Rows without a
/// language code are left out. Equal means stay in alphabetical order.
pub fn mean_by_language<F>(reviews: &[ScoredReview], value: F) -> Vec<LanguageMean>
where
    F: Fn(&ScoredReview) -> Option<f64>,
{
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for review in reviews {
        let Some(language) = review.review.language_code.as_deref() else {
            continue;
        };
        let entry = groups.entry(language).or_insert((0.0, 0));
        if let Some(x) = value(review) {
            entry.0 += x;
            entry.1 += 1;
        }
    }

    let mut means: Vec<LanguageMean> = groups
        .into_iter()
        .map(|(language, (sum, count))| LanguageMean {
            language: language.to_string(),
            mean: if count == 0 { f64::NAN } else { sum / count as f64 },
        })
        .collect();

    means.sort_by(|a, b| descending_nan_last(a.mean, b.mean));
    means
}

/// Average rating per language, highest first.
pub fn average_rating_by_language(reviews: &[ScoredReview]) -> Vec<LanguageMean> {
    mean_by_language(reviews, |r| r.review.rating_value)
}

/// Average review-text sentiment per language, highest first.
pub fn average_sentiment_by_language(reviews: &[ScoredReview]) -> Vec<LanguageMean> {
    mean_by_language(reviews, |r| Some(r.sentiment))
}

/// Equal-width bucket counts over `[start, start + width * counts.len()]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn end(&self) -> f64 {
        self.start + self.width * self.counts.len() as f64
    }

    /// `(lower, upper, count)` for each bucket.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.counts.iter().enumerate().map(|(i, &count)| {
            let lower = self.start + self.width * i as f64;
            (lower, lower + self.width, count)
        })
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Buckets `values` into `bins` equal-width bins spanning their range.
///
/// The last bin is closed on the right. A single distinct value widens the range to
/// `value ± 0.5`. Returns `None` when there is nothing to count.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    Some(Histogram {
        start: lo,
        width,
        counts,
    })
}

/// Gaussian kernel density of `values`, scaled to histogram counts.
///
/// Bandwidth follows Scott's rule (`σ · n^(-1/5)`); the curve is sampled at `points`
/// positions across the histogram's range. Empty when fewer than two values or no
/// spread.
pub fn kde_curve(values: &[f64], histogram: &Histogram, points: usize) -> Vec<(f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 || points < 2 {
        return Vec::new();
    }

    let std_dev = calculate_statistics("", &finite).std_dev;
    if std_dev.is_nan() || std_dev <= 0.0 {
        return Vec::new();
    }

    let bandwidth = std_dev * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n as f64 * histogram.width;

    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (hi - lo) / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density = norm
                * finite
                    .iter()
                    .map(|&xi| {
                        let z = (x - xi) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum::<f64>();
            (x, density * scale)
        })
        .collect()
}

/// Number of samples on each density curve.
const KDE_POINTS: usize = 200;

/// A histogram plus its density overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub histogram: Option<Histogram>,
    pub density: Vec<(f64, f64)>,
}

impl Distribution {
    pub fn of(values: &[f64], bins: usize) -> Self {
        let histogram = histogram(values, bins);
        let density = histogram
            .as_ref()
            .map(|h| kde_curve(values, h, KDE_POINTS))
            .unwrap_or_default();
        Self { histogram, density }
    }
}

/// Everything the renderer and console report need.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub row_count: usize,
    pub statistics: Vec<Statistics>,
    pub ratings: Distribution,
    pub monthly_counts: Vec<MonthlyCount>,
    pub sentiment: Distribution,
    pub top_products: Vec<ProductCount>,
    pub rating_by_language: Vec<LanguageMean>,
    pub sentiment_by_language: Vec<LanguageMean>,
}

/// Runs every aggregation over the scored table.
pub fn analyze(
    reviews: &[ScoredReview],
    schema: &ReviewSchema,
    options: &ChartOptions,
) -> AnalysisReport {
    if reviews.is_empty() {
        warn!("No reviews to analyze; charts will be empty");
    }

    let ratings: Vec<f64> = reviews.iter().filter_map(|r| r.review.rating_value).collect();
    let sentiment: Vec<f64> = reviews.iter().map(|r| r.sentiment).collect();

    let report = AnalysisReport {
        row_count: reviews.len(),
        statistics: describe(reviews, schema),
        ratings: Distribution::of(&ratings, options.rating_bins),
        monthly_counts: monthly_review_counts(reviews),
        sentiment: Distribution::of(&sentiment, options.sentiment_bins),
        top_products: top_products(reviews, options.top_products),
        rating_by_language: average_rating_by_language(reviews),
        sentiment_by_language: average_sentiment_by_language(reviews),
    };

    info!(
        "Aggregated {} reviews over {} months, {} languages, {} ranked products",
        report.row_count,
        report.monthly_counts.len(),
        report.rating_by_language.len(),
        report.top_products.len()
    );
    report
}
