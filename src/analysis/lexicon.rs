//! Lexicon-based sentiment scoring and term frequencies.
//!
//! Scoring follows the usual rule-based approach for short social text:
//! word valences on a -4..4 scale, intensity boosters, negation within a
//! three-word window, contrast after "but", and exclamation emphasis. The
//! compound score is the valence sum normalised into -1..1.

use crate::analysis::CsvTable;
use crate::error::Result;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").unwrap());
static PUNCT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static DIGIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

/// Compound threshold separating neutral from polar text
const LABEL_THRESHOLD: f64 = 0.05;
/// Normalisation constant for the compound score
const ALPHA: f64 = 15.0;
const BOOSTER_INCR: f64 = 0.293;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCR: f64 = 0.292;

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
        "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
        "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
        "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
        "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
        "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
        "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
        "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
    ]
    .into_iter()
    .collect()
});

static VALENCES: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    [
        // positive
        ("good", 1.9), ("great", 3.1), ("excellent", 2.7), ("amazing", 2.8),
        ("awesome", 3.1), ("fantastic", 2.6), ("wonderful", 2.7), ("perfect", 2.7),
        ("love", 3.2), ("loved", 2.9), ("like", 2.0), ("liked", 1.8), ("best", 3.2),
        ("better", 1.9), ("nice", 1.8), ("happy", 2.7), ("pleased", 1.9), ("satisfied", 1.8),
        ("helpful", 1.8), ("friendly", 2.2), ("kind", 2.4), ("easy", 1.9), ("quick", 1.0),
        ("fast", 1.1), ("efficient", 1.6), ("reliable", 1.8), ("recommend", 1.5),
        ("recommended", 1.6), ("thanks", 1.9), ("thank", 1.5), ("grateful", 2.0),
        ("professional", 1.4), ("polite", 1.6), ("smooth", 1.2), ("resolved", 1.4),
        ("solved", 1.1), ("fixed", 0.9), ("impressed", 2.1), ("outstanding", 3.0),
        ("superb", 3.1), ("brilliant", 2.8), ("glad", 2.0), ("enjoy", 2.2), ("enjoyed", 2.3),
        ("fair", 1.3), ("appreciate", 1.7), ("appreciated", 2.3), ("support", 1.7),
        ("supportive", 1.2), ("patient", 1.4), ("ok", 1.2), ("okay", 0.9), ("fine", 0.8),
        ("worth", 0.9), ("win", 2.8), ("success", 2.7), ("successful", 2.8),
        // negative
        ("bad", -2.5), ("terrible", -2.1), ("horrible", -2.5), ("awful", -2.0),
        ("worst", -3.1), ("worse", -2.1), ("poor", -2.1), ("hate", -2.7), ("hated", -3.2),
        ("useless", -1.8), ("rude", -2.0), ("slow", -0.7), ("late", -0.8), ("delay", -1.3),
        ("delayed", -0.9), ("broken", -2.1), ("wrong", -2.1), ("problem", -1.7),
        ("problems", -1.7), ("issue", -0.6), ("issues", -0.6), ("disappointed", -1.9),
        ("disappointing", -2.2), ("frustrated", -2.4), ("frustrating", -1.9), ("angry", -2.3),
        ("annoyed", -1.6), ("annoying", -1.7), ("unhelpful", -1.7), ("scam", -2.8),
        ("fraud", -2.8), ("waste", -1.8), ("wasted", -2.2), ("refund", -0.4), ("fail", -2.5),
        ("failed", -2.3), ("failure", -2.3), ("never", -0.6), ("ignored", -1.3),
        ("lost", -1.3), ("missing", -1.2), ("complaint", -1.5), ("unacceptable", -2.0),
        ("ridiculous", -1.5), ("nightmare", -2.9), ("avoid", -1.2), ("sad", -2.1),
        ("sorry", -0.3), ("cancel", -1.0), ("cancelled", -1.0), ("damaged", -2.2),
        ("incompetent", -2.3), ("pathetic", -2.4), ("stupid", -2.4), ("hard", -0.4),
    ]
    .into_iter()
    .collect()
});

static BOOSTERS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    [
        ("absolutely", BOOSTER_INCR), ("completely", BOOSTER_INCR), ("extremely", BOOSTER_INCR),
        ("really", BOOSTER_INCR), ("so", BOOSTER_INCR), ("super", BOOSTER_INCR),
        ("totally", BOOSTER_INCR), ("very", BOOSTER_INCR), ("incredibly", BOOSTER_INCR),
        ("highly", BOOSTER_INCR), ("most", BOOSTER_INCR), ("utterly", BOOSTER_INCR),
        ("barely", -BOOSTER_INCR), ("hardly", -BOOSTER_INCR), ("slightly", -BOOSTER_INCR),
        ("somewhat", -BOOSTER_INCR), ("kinda", -BOOSTER_INCR), ("marginally", -BOOSTER_INCR),
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "not", "no", "never", "none", "nothing", "nobody", "neither", "nor", "cannot", "cant",
        "can't", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't",
        "wasnt", "wasn't", "arent", "aren't", "wont", "won't", "wouldnt", "wouldn't",
        "shouldnt", "shouldn't", "couldnt", "couldn't", "havent", "haven't", "without",
    ]
    .into_iter()
    .collect()
});

/// Polarity label derived from the compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn from_compound(compound: f64) -> Self {
        if compound >= LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub compound: f64,
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
    pub label: SentimentLabel,
}

impl SentimentScores {
    pub fn neutral() -> Self {
        Self {
            compound: 0.0,
            pos: 0.0,
            neg: 0.0,
            neu: 1.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Lowercase, drop URLs, punctuation, digits and stopwords, then stem
/// what is left so inflected forms count as one term
pub fn preprocess_text(text: &str) -> String {
    let text = text.to_lowercase();
    let text = URL_REGEX.replace_all(&text, "");
    let text = PUNCT_REGEX.replace_all(&text, "");
    let text = DIGIT_REGEX.replace_all(&text, "");

    text.split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .map(|token| STEMMER.stem(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score raw review text
pub fn analyze_sentiment(text: &str) -> SentimentScores {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect();

    if tokens.is_empty() {
        return SentimentScores::neutral();
    }

    let mut valences: Vec<f64> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| token_valence(&tokens, i, token))
        .collect();

    if let Some(but) = tokens.iter().position(|t| t == "but") {
        for (i, valence) in valences.iter_mut().enumerate() {
            if i < but {
                *valence *= 0.5;
            } else if i > but {
                *valence *= 1.5;
            }
        }
    }

    let emphasis = text.matches('!').count().min(4) as f64 * EXCLAMATION_INCR;
    let mut sum: f64 = valences.iter().sum();
    if sum > 0.0 {
        sum += emphasis;
    } else if sum < 0.0 {
        sum -= emphasis;
    }

    let compound = sum / (sum * sum + ALPHA).sqrt();
    let compound = compound.clamp(-1.0, 1.0);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for valence in &valences {
        if *valence > 0.0 {
            pos_sum += valence + 1.0;
        } else if *valence < 0.0 {
            neg_sum += valence - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += emphasis;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= emphasis;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    SentimentScores {
        compound: round_to(compound, 4),
        pos: round_to(pos_sum / total, 3),
        neg: round_to(neg_sum.abs() / total, 3),
        neu: round_to(neu_count / total, 3),
        label: SentimentLabel::from_compound(compound),
    }
}

/// Valence of token `i` after boosters and negation in the three preceding words
fn token_valence(tokens: &[String], i: usize, token: &str) -> f64 {
    let Some(&base) = VALENCES.get(token) else {
        return 0.0;
    };

    let mut valence = base;
    for distance in 1..=3 {
        let Some(previous) = i.checked_sub(distance).map(|j| tokens[j].as_str()) else {
            break;
        };

        if let Some(&boost) = BOOSTERS.get(previous) {
            let damping = match distance {
                1 => 1.0,
                2 => 0.95,
                _ => 0.9,
            };
            let boost = boost * damping;
            valence += if valence > 0.0 { boost } else { -boost };
        }

        if NEGATIONS.contains(previous) {
            valence *= NEGATION_SCALAR;
        }
    }

    valence
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Most common terms over whitespace-separated texts, ties in first-seen order
pub fn top_terms<'a, I>(texts: I, top_n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
    let mut next_seen = 0;
    for word in texts.into_iter().flat_map(str::split_whitespace) {
        let entry = counts.entry(word).or_insert_with(|| {
            next_seen += 1;
            (0, next_seen)
        });
        entry.0 += 1;
    }

    let mut terms: Vec<_> = counts.into_iter().collect();
    terms.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
    terms
        .into_iter()
        .take(top_n)
        .map(|(word, (count, _))| (word.to_string(), count))
        .collect()
}

/// What the lexicon pass found, for printing
#[derive(Debug, Clone, Default)]
pub struct LexiconReport {
    pub rows: usize,
    /// Label counts, most frequent first
    pub distribution: Vec<(SentimentLabel, usize)>,
    pub top_overall: Vec<(String, usize)>,
    pub top_by_label: Vec<(SentimentLabel, Vec<(String, usize)>)>,
}

/// Score every row of `input` and write the augmented table to `output`
pub fn analyze_csv(input: &Path, column: &str, output: &Path, top_n: usize) -> Result<LexiconReport> {
    let mut table = CsvTable::read(input)?;
    let index = table.column_index(column)?;
    ::log::info!("Loaded {} reviews from {}", table.rows.len(), input.display());

    ::log::info!("Preprocessing text...");
    let processed: Vec<String> = table
        .column_values(index)
        .map(|text| text.map(preprocess_text).unwrap_or_default())
        .collect();

    ::log::info!("Analyzing sentiment...");
    let scores: Vec<SentimentScores> = table
        .column_values(index)
        .map(|text| text.map(analyze_sentiment).unwrap_or_else(SentimentScores::neutral))
        .collect();

    let mut distribution: Vec<(SentimentLabel, usize)> = SentimentLabel::ALL
        .into_iter()
        .map(|label| (label, scores.iter().filter(|s| s.label == label).count()))
        .filter(|(_, count)| *count > 0)
        .collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1));

    ::log::info!("Extracting frequent terms...");
    let top_overall = top_terms(processed.iter().map(String::as_str), top_n);
    let top_by_label = SentimentLabel::ALL
        .into_iter()
        .map(|label| {
            let texts = processed
                .iter()
                .zip(&scores)
                .filter(|(_, s)| s.label == label)
                .map(|(text, _)| text.as_str());
            (label, top_terms(texts, top_n))
        })
        .collect();

    let rows = table.rows.len();
    table.push_column("processed_text", processed);
    table.push_column("compound", scores.iter().map(|s| s.compound.to_string()).collect());
    table.push_column("positive", scores.iter().map(|s| s.pos.to_string()).collect());
    table.push_column("negative", scores.iter().map(|s| s.neg.to_string()).collect());
    table.push_column("neutral", scores.iter().map(|s| s.neu.to_string()).collect());
    table.push_column("sentiment", scores.iter().map(|s| s.label.to_string()).collect());
    table.write(output)?;
    ::log::info!("Analysis complete! Results saved to '{}'", output.display());

    Ok(LexiconReport {
        rows,
        distribution,
        top_overall,
        top_by_label,
    })
}
