//! SVG rendering of the six review charts.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::{debug, info};

use crate::analysis::{AnalysisReport, Distribution, LanguageMean, MonthlyCount, ProductCount};
use crate::error::{Result, ReviewError};

/// Fixed title and axis labels of one figure, plus the slug used in its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub slug: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

pub const RATINGS_CHART: ChartSpec = ChartSpec {
    slug: "ratings_distribution",
    title: "Distribution of Ratings",
    x_label: "Rating Value",
    y_label: "Frequency",
};

pub const MONTHLY_CHART: ChartSpec = ChartSpec {
    slug: "review_counts_over_time",
    title: "Review Counts Over Time",
    x_label: "Date",
    y_label: "Review Count",
};

pub const SENTIMENT_CHART: ChartSpec = ChartSpec {
    slug: "sentiment_distribution",
    title: "Sentiment Distribution",
    x_label: "Sentiment Polarity",
    y_label: "Frequency",
};

pub const TOP_PRODUCTS_CHART: ChartSpec = ChartSpec {
    slug: "top_products",
    title: "Top 10 Most Reviewed Products",
    x_label: "Product ID",
    y_label: "Number of Reviews",
};

pub const RATING_BY_LANGUAGE_CHART: ChartSpec = ChartSpec {
    slug: "rating_by_language",
    title: "Average Rating by Language",
    x_label: "Language",
    y_label: "Average Rating Value",
};

pub const SENTIMENT_BY_LANGUAGE_CHART: ChartSpec = ChartSpec {
    slug: "sentiment_by_language",
    title: "Average Sentiment by Language",
    x_label: "Language",
    y_label: "Average Sentiment Polarity",
};

/// Figures in rendering order.
pub const CHARTS: [ChartSpec; 6] = [
    RATINGS_CHART,
    MONTHLY_CHART,
    SENTIMENT_CHART,
    TOP_PRODUCTS_CHART,
    RATING_BY_LANGUAGE_CHART,
    SENTIMENT_BY_LANGUAGE_CHART,
];

const HISTOGRAM_COLOR: RGBColor = RGBColor(31, 119, 180);
const CAPTION_FONT: (&str, i32) = ("sans-serif", 28);

/// Sequential color ramps for bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Viridis,
    Coolwarm,
}

impl Palette {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Palette::Viridis => &[
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            Palette::Coolwarm => &[
                (59, 76, 192),
                (144, 178, 254),
                (221, 221, 221),
                (245, 156, 125),
                (180, 4, 38),
            ],
        }
    }

    /// Samples the ramp at position `t` in `[0, 1]`.
    pub fn at(self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
        let index = (t.floor() as usize).min(stops.len() - 2);
        let frac = t - index as f64;
        let (r0, g0, b0) = stops[index];
        let (r1, g1, b1) = stops[index + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    /// Color of bar `index` out of `total`, sampled evenly without the ramp's ends.
    pub fn color(self, index: usize, total: usize) -> RGBColor {
        self.at((index + 1) as f64 / (total + 1) as f64)
    }
}

/// `[lo, hi]` covering zero and every finite value, padded by 10%.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo == hi {
        return (0.0, 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

fn draw_distribution(
    path: &Path,
    spec: &ChartSpec,
    distribution: &Distribution,
    size: (u32, u32),
) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReviewError::render)?;

    let (x_range, y_top) = match &distribution.histogram {
        Some(histogram) => {
            let peak = distribution
                .density
                .iter()
                .map(|&(_, y)| y)
                .fold(histogram.max_count() as f64, f64::max);
            (histogram.start..histogram.end(), (peak * 1.1).max(1.0))
        }
        None => (0.0..1.0, 1.0),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0f64..y_top)
        .map_err(ReviewError::render)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .draw()
        .map_err(ReviewError::render)?;

    if let Some(histogram) = &distribution.histogram {
        chart
            .draw_series(histogram.buckets().map(|(lower, upper, count)| {
                Rectangle::new(
                    [(lower, 0.0), (upper, count as f64)],
                    HISTOGRAM_COLOR.mix(0.6).filled(),
                )
            }))
            .map_err(ReviewError::render)?;
        chart
            .draw_series(histogram.buckets().map(|(lower, upper, count)| {
                Rectangle::new([(lower, 0.0), (upper, count as f64)], WHITE.stroke_width(1))
            }))
            .map_err(ReviewError::render)?;
    }

    if !distribution.density.is_empty() {
        chart
            .draw_series(LineSeries::new(
                distribution.density.iter().copied(),
                HISTOGRAM_COLOR.stroke_width(2),
            ))
            .map_err(ReviewError::render)?;
    }

    root.present().map_err(ReviewError::render)?;
    Ok(())
}

fn draw_monthly_counts(
    path: &Path,
    spec: &ChartSpec,
    counts: &[MonthlyCount],
    size: (u32, u32),
) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReviewError::render)?;

    let x_end = counts.len().saturating_sub(1).max(1) as i32;
    let (_, y_top) = value_range(counts.iter().map(|m| m.count as f64));

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0i32..x_end, 0f64..y_top)
        .map_err(ReviewError::render)?;

    let month_label = |x: &i32| {
        usize::try_from(*x)
            .ok()
            .and_then(|i| counts.get(i))
            .map(|m| m.month.to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .x_labels(counts.len().clamp(2, 12))
        .x_label_formatter(&month_label)
        .draw()
        .map_err(ReviewError::render)?;

    let points: Vec<(i32, f64)> = counts
        .iter()
        .enumerate()
        .map(|(i, m)| (i as i32, m.count as f64))
        .collect();

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            HISTOGRAM_COLOR.stroke_width(2),
        ))
        .map_err(ReviewError::render)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 3, HISTOGRAM_COLOR.filled())),
        )
        .map_err(ReviewError::render)?;

    root.present().map_err(ReviewError::render)?;
    Ok(())
}

fn draw_bars(
    path: &Path,
    spec: &ChartSpec,
    bars: &[(String, f64)],
    palette: Palette,
    size: (u32, u32),
) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReviewError::render)?;

    let slots = bars.len().max(1) as i32;
    let (y_low, y_top) = value_range(bars.iter().map(|(_, value)| *value));

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..slots).into_segmented(), y_low..y_top)
        .map_err(ReviewError::render)?;

    let bar_label = |value: &SegmentValue<i32>| match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| bars.get(i))
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .x_labels(bars.len().max(1))
        .x_label_formatter(&bar_label)
        .draw()
        .map_err(ReviewError::render)?;

    chart
        .draw_series(
            bars.iter()
                .enumerate()
                .filter(|(_, (_, value))| value.is_finite())
                .map(|(i, (_, value))| {
                    let color = palette.color(i, bars.len());
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(i as i32), 0.0),
                            (SegmentValue::Exact(i as i32 + 1), *value),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 6, 6);
                    bar
                }),
        )
        .map_err(ReviewError::render)?;

    root.present().map_err(ReviewError::render)?;
    Ok(())
}

fn product_bars(products: &[ProductCount]) -> Vec<(String, f64)> {
    products
        .iter()
        .map(|p| (p.product_id.clone(), p.count as f64))
        .collect()
}

fn language_bars(means: &[LanguageMean]) -> Vec<(String, f64)> {
    means.iter().map(|m| (m.language.clone(), m.mean)).collect()
}

/// Writes the six figures as SVG files under `output_dir` and returns their paths
/// in rendering order. File names are `<basename>_<slug>_<timestamp>.svg`.
pub fn render_charts(
    report: &AnalysisReport,
    output_dir: impl AsRef<Path>,
    basename: &str,
    timestamp: &str,
    size: (u32, u32),
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let path_for = |spec: &ChartSpec| {
        output_dir.join(format!("{}_{}_{}.svg", basename, spec.slug, timestamp))
    };
    let paths: Vec<PathBuf> = CHARTS.iter().map(path_for).collect();

    draw_distribution(&paths[0], &RATINGS_CHART, &report.ratings, size)?;
    draw_monthly_counts(&paths[1], &MONTHLY_CHART, &report.monthly_counts, size)?;
    draw_distribution(&paths[2], &SENTIMENT_CHART, &report.sentiment, size)?;
    draw_bars(
        &paths[3],
        &TOP_PRODUCTS_CHART,
        &product_bars(&report.top_products),
        Palette::Viridis,
        size,
    )?;
    draw_bars(
        &paths[4],
        &RATING_BY_LANGUAGE_CHART,
        &language_bars(&report.rating_by_language),
        Palette::Coolwarm,
        size,
    )?;
    draw_bars(
        &paths[5],
        &SENTIMENT_BY_LANGUAGE_CHART,
        &language_bars(&report.sentiment_by_language),
        Palette::Coolwarm,
        size,
    )?;

    for path in &paths {
        debug!("Wrote chart {}", path.display());
    }
    info!("Rendered {} charts into {}", paths.len(), output_dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Distribution, analyze};
    use crate::config::{ChartOptions, ReviewSchema};
    use crate::table::{Review, ScoredReview};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_report() -> AnalysisReport {
        let rows: Vec<ScoredReview> = [
            ("2023-01-05", "101", "en", 50.0, 0.6),
            ("2023-01-20", "102", "en", 40.0, -0.2),
            ("2023-03-01", "101", "ru", 50.0, 0.0),
        ]
        .iter()
        .map(|&(date, product, language, rating, sentiment)| ScoredReview {
            review: Review {
                posted_date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                review_text: String::new(),
                translated_review_text: String::new(),
                rating_value: Some(rating),
                product_id: Some(product.to_string()),
                language_code: Some(language.to_string()),
            },
            sentiment,
            translated_sentiment: sentiment,
        })
        .collect();
        analyze(&rows, &ReviewSchema::default(), &ChartOptions::default())
    }

    #[test]
    fn test_chart_order_and_labels() {
        let titles: Vec<&str> = CHARTS.iter().map(|c| c.title).collect();
        assert_eq!(
            titles,
            vec![
                "Distribution of Ratings",
                "Review Counts Over Time",
                "Sentiment Distribution",
                "Top 10 Most Reviewed Products",
                "Average Rating by Language",
                "Average Sentiment by Language",
            ]
        );
        assert_eq!(TOP_PRODUCTS_CHART.x_label, "Product ID");
        assert_eq!(SENTIMENT_BY_LANGUAGE_CHART.y_label, "Average Sentiment Polarity");
    }

    #[test]
    fn test_render_writes_six_svg_files() {
        let dir = tempdir().unwrap();
        let paths = render_charts(
            &sample_report(),
            dir.path(),
            "reviews",
            "1700000000",
            (800, 500),
        )
        .unwrap();

        assert_eq!(paths.len(), 6);
        for (path, spec) in paths.iter().zip(CHARTS.iter()) {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert_eq!(name, format!("reviews_{}_1700000000.svg", spec.slug));

            let svg = fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"));
            assert!(svg.contains(spec.title), "{} missing title", name);
        }
    }

    #[test]
    fn test_render_handles_empty_report() {
        let dir = tempdir().unwrap();
        let report = AnalysisReport {
            row_count: 0,
            statistics: Vec::new(),
            ratings: Distribution::of(&[], 10),
            monthly_counts: Vec::new(),
            sentiment: Distribution::of(&[], 20),
            top_products: Vec::new(),
            rating_by_language: Vec::new(),
            sentiment_by_language: Vec::new(),
        };

        let paths =
            render_charts(&report, dir.path().join("nested"), "empty", "0", (640, 480)).unwrap();
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_palette_endpoints_and_sampling() {
        assert_eq!(Palette::Viridis.at(0.0), RGBColor(68, 1, 84));
        assert_eq!(Palette::Viridis.at(1.0), RGBColor(253, 231, 37));
        assert_eq!(Palette::Coolwarm.at(0.5), RGBColor(221, 221, 221));
        // one bar sits in the middle of the ramp
        assert_eq!(Palette::Coolwarm.color(0, 1), RGBColor(221, 221, 221));
    }

    #[test]
    fn test_value_range_includes_zero() {
        let (lo, hi) = value_range([2.0, 4.0].into_iter());
        assert_eq!(lo, 0.0);
        assert!((hi - 4.4).abs() < 1e-12);
        let (lo, hi) = value_range([-0.5, 0.5].into_iter());
        assert!(lo < -0.5 && hi > 0.5);
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(value_range([f64::NAN].into_iter()), (0.0, 1.0));
    }
}
