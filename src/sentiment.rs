//! Rule-based sentiment polarity for review text.
//!
//! Each word found in the lexicon contributes its polarity; an intensifier scales
//! the next polarity word and a preceding negation flips and halves it. The text
//! polarity is the mean over the scored words, clamped to [-1.0, 1.0].

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::table::{Review, ScoredReview};

/// Maps free text to a polarity in [-1.0, 1.0]; 0.0 is neutral.
pub trait PolarityScorer {
    fn score(&self, text: &str) -> f64;
}

/// Word polarities, intensifiers and negations for English product reviews.
#[derive(Debug, Clone)]
pub struct ReviewLexicon {
    polarity: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl ReviewLexicon {
    pub fn new() -> Self {
        let mut polarity = HashMap::new();

        let strong_positive = [
            ("excellent", 1.0),
            ("perfect", 1.0),
            ("perfectly", 1.0),
            ("best", 1.0),
            ("awesome", 1.0),
            ("wonderful", 1.0),
            ("superb", 1.0),
            ("impressive", 1.0),
            ("outstanding", 0.9),
            ("beautiful", 0.85),
            ("great", 0.8),
            ("happy", 0.8),
            ("delighted", 0.7),
            ("loved", 0.7),
            ("pleasant", 0.73),
            ("good", 0.7),
        ];

        let moderate_positive = [
            ("amazing", 0.6),
            ("nice", 0.6),
            ("love", 0.5),
            ("lovely", 0.5),
            ("cute", 0.5),
            ("comfy", 0.5),
            ("stylish", 0.5),
            ("reliable", 0.5),
            ("satisfied", 0.5),
            ("pleased", 0.5),
            ("glad", 0.5),
            ("favorite", 0.5),
            ("excited", 0.45),
            ("easy", 0.43),
            ("fine", 0.42),
            ("fantastic", 0.4),
            ("comfortable", 0.4),
            ("breathable", 0.4),
            ("durable", 0.4),
            ("sturdy", 0.4),
            ("recommend", 0.4),
            ("recommended", 0.4),
            ("cool", 0.35),
            ("quick", 0.33),
            ("convenient", 0.3),
            ("worth", 0.3),
            ("pretty", 0.25),
            ("fast", 0.2),
            ("thanks", 0.2),
            ("soft", 0.1),
        ];

        let strong_negative = [
            ("terrible", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("worst", -1.0),
            ("disgusting", -1.0),
            ("hated", -0.9),
            ("hate", -0.8),
            ("annoying", -0.8),
            ("disappointed", -0.75),
            ("bad", -0.7),
            ("ugly", -0.7),
        ];

        let moderate_negative = [
            ("disappointing", -0.6),
            ("unpleasant", -0.6),
            ("defective", -0.6),
            ("faulty", -0.6),
            ("overpriced", -0.6),
            ("dirty", -0.6),
            ("uncomfortable", -0.5),
            ("useless", -0.5),
            ("wrong", -0.5),
            ("fake", -0.5),
            ("flimsy", -0.5),
            ("smelly", -0.5),
            ("damaged", -0.5),
            ("expensive", -0.5),
            ("difficult", -0.5),
            ("sad", -0.5),
            ("angry", -0.5),
            ("poor", -0.4),
            ("thin", -0.4),
            ("broken", -0.4),
            ("torn", -0.4),
            ("itchy", -0.4),
            ("scratchy", -0.4),
            ("mediocre", -0.3),
            ("tight", -0.3),
            ("stiff", -0.3),
            ("slow", -0.3),
            ("late", -0.3),
            ("rude", -0.3),
            ("hard", -0.29),
            ("small", -0.25),
            ("missing", -0.2),
            ("waste", -0.2),
        ];

        for (word, score) in strong_positive
            .iter()
            .chain(moderate_positive.iter())
            .chain(strong_negative.iter())
            .chain(moderate_negative.iter())
        {
            polarity.insert(word.to_string(), *score);
        }

        let intensifiers = [
            ("extremely", 1.5),
            ("incredibly", 1.5),
            ("absolutely", 1.5),
            ("super", 1.4),
            ("highly", 1.4),
            ("very", 1.3),
            ("really", 1.3),
            ("totally", 1.3),
            ("so", 1.2),
            ("too", 1.2),
            ("quite", 1.1),
            ("rather", 0.9),
            ("fairly", 0.9),
            ("somewhat", 0.7),
            ("slightly", 0.6),
            ("barely", 0.5),
        ]
        .iter()
        .map(|(word, factor)| (word.to_string(), *factor))
        .collect();

        let negations = [
            "not", "no", "never", "none", "nothing", "neither", "nor", "hardly", "without",
            "cannot", "cant", "dont", "didnt", "doesnt", "isnt", "wasnt", "wont",
        ]
        .iter()
        .map(|word| word.to_string())
        .collect();

        Self {
            polarity,
            intensifiers,
            negations,
        }
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.polarity.get(word).copied()
    }

    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.ends_with("n't")
    }

    /// Add or override a word polarity, clamped to [-1.0, 1.0].
    ///
    /// Product vocabulary the built-in tables miss is registered here before the
    /// lexicon is handed to [`LexiconScorer::with_lexicon`].
    ///
    /// ```
    /// use review_analyzer_rust::sentiment::{LexiconScorer, PolarityScorer, ReviewLexicon};
    ///
    /// let lexicon = ReviewLexicon::new().with_word("snug", 0.6);
    /// let scorer = LexiconScorer::new().with_lexicon(lexicon);
    /// assert!(scorer.score("a snug fit") > 0.0);
    /// ```
    pub fn with_word(mut self, word: &str, score: f64) -> Self {
        self.polarity
            .insert(word.to_lowercase(), score.clamp(-1.0, 1.0));
        self
    }
}

impl Default for ReviewLexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits text into lowercase words; apostrophes inside a word are kept.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '\u{2019}'))
        .map(|token| token.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|token| !token.is_empty())
        .map(|token| token.replace('\u{2019}', "'").to_lowercase())
        .collect()
}

/// Lexicon-driven polarity scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: ReviewLexicon,
    /// How many tokens a negation reaches forward.
    negation_window: usize,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            lexicon: ReviewLexicon::new(),
            negation_window: 3,
        }
    }

    /// Score against a custom lexicon instead of the built-in one.
    pub fn with_lexicon(mut self, lexicon: ReviewLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// How many tokens after a negation still get flipped. Longer windows suit
    /// translated text, where the negation often sits further from the adjective.
    ///
    /// ```
    /// use review_analyzer_rust::sentiment::{LexiconScorer, PolarityScorer};
    ///
    /// let wide = LexiconScorer::new().with_negation_window(5);
    /// assert!(wide.score("not for me though good") < 0.0);
    /// ```
    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut modifier: Option<f64> = None;
        let mut since_negation: Option<usize> = None;

        for token in tokenize(text) {
            if self.lexicon.is_negation(&token) {
                since_negation = Some(0);
                modifier = None;
                continue;
            }

            if let Some(factor) = self.lexicon.intensifier(&token) {
                modifier = Some(factor);
            } else if let Some(base) = self.lexicon.polarity(&token) {
                let mut score = base * modifier.take().unwrap_or(1.0);
                if since_negation.is_some() {
                    score *= -0.5;
                    since_negation = None;
                }
                scores.push(score.clamp(-1.0, 1.0));
            } else {
                modifier = None;
            }

            since_negation = since_negation
                .map(|distance| distance + 1)
                .filter(|distance| *distance < self.negation_window);
        }

        if scores.is_empty() {
            return 0.0;
        }
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }
}

/// Attaches `sentiment` and `translated_sentiment` to every review.
pub fn score_reviews(reviews: Vec<Review>, scorer: &impl PolarityScorer) -> Vec<ScoredReview> {
    let scored: Vec<ScoredReview> = reviews
        .into_iter()
        .map(|review| ScoredReview {
            sentiment: scorer.score(&review.review_text),
            translated_sentiment: scorer.score(&review.translated_review_text),
            review,
        })
        .collect();

    debug!("Scored sentiment for {} reviews", scored.len());
    scored
}
