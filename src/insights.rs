//! Closing insights and recommendations.
//!
//! This block is static, hand-written content about the face-mask review export.
//! It is printed as-is and is not computed from the aggregates.

use std::io::{self, Write};

pub const INSIGHTS: [&str; 6] = [
    "The majority of ratings are very positive, with many reviews giving a 50 out of 50 rating.",
    "Reviews have been consistent over time, with some fluctuations.",
    "Sentiment analysis shows that most reviews are positive, with a few neutral or negative sentiments.",
    "The top 10 most reviewed products should be considered for further marketing and production focus.",
    "English and Russian are the most common languages in reviews, with very positive average ratings.",
    "Users appreciate the quality, comfort, and material of the face masks, as indicated in the positive sentiments.",
];

pub const RECOMMENDATIONS: [&str; 4] = [
    "Maintain the high quality of face masks to ensure continued positive reviews.",
    "Focus on the top-reviewed products for further enhancements and marketing campaigns.",
    "Address any common issues noted in negative reviews to improve overall customer satisfaction.",
    "Expand marketing efforts in regions with high review activity (e.g., English and Russian speaking regions).",
];

/// Writes the insights block, numbered, followed by the recommendations.
pub fn write_insights<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Insights and Recommendations:\n")?;
    for (i, insight) in INSIGHTS.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, insight)?;
    }

    writeln!(out, "\nRecommendations:")?;
    for (i, recommendation) in RECOMMENDATIONS.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, recommendation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insights_text_is_verbatim() {
        let mut out = Vec::new();
        write_insights(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\
Insights and Recommendations:

1. The majority of ratings are very positive, with many reviews giving a 50 out of 50 rating.
2. Reviews have been consistent over time, with some fluctuations.
3. Sentiment analysis shows that most reviews are positive, with a few neutral or negative sentiments.
4. The top 10 most reviewed products should be considered for further marketing and production focus.
5. English and Russian are the most common languages in reviews, with very positive average ratings.
6. Users appreciate the quality, comfort, and material of the face masks, as indicated in the positive sentiments.

Recommendations:
1. Maintain the high quality of face masks to ensure continued positive reviews.
2. Focus on the top-reviewed products for further enhancements and marketing campaigns.
3. Address any common issues noted in negative reviews to improve overall customer satisfaction.
4. Expand marketing efforts in regions with high review activity (e.g., English and Russian speaking regions).
";
        assert_eq!(text, expected);
    }
}
