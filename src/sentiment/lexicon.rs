// src/sentiment/lexicon.rs
//! Lexicon sentiment classifier: word polarity table plus a short negation
//! window. Ships embedded English and standard-Arabic lexicons; other languages
//! can be loaded from a JSON file (`{"word": polarity, ...}`).

use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::{RawSentiment, SentimentClassifier};
use crate::lang::is_arabic_mark;

static LEXICON_EN: Lazy<Arc<HashMap<String, i32>>> = Lazy::new(|| {
    let raw = include_str!("../../data/lexicon_en.json");
    Arc::new(serde_json::from_str::<HashMap<String, i32>>(raw).unwrap_or_default())
});

static LEXICON_AR: Lazy<Arc<HashMap<String, i32>>> = Lazy::new(|| {
    let raw = include_str!("../../data/lexicon_ar.json");
    Arc::new(serde_json::from_str::<HashMap<String, i32>>(raw).unwrap_or_default())
});

const NEGATORS_EN: &[&str] = &[
    "not", "no", "never", "isnt", "wasnt", "arent", "wont", "cant", "cannot", "without", "dont",
    "didnt", "doesnt",
];

// Standard-register negation; dialect forms are rewritten to these upstream.
const NEGATORS_AR: &[&str] = &["ليس", "لا", "لم", "لن", "ما", "غير", "ليست"];

/// How many preceding tokens can flip a word's polarity.
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone)]
pub struct LexiconSentimentClassifier {
    name: String,
    lexicon: Arc<HashMap<String, i32>>,
    negators: HashSet<String>,
}

impl LexiconSentimentClassifier {
    pub fn new(name: impl Into<String>, lexicon: HashMap<String, i32>, negators: &[&str]) -> Self {
        Self {
            name: name.into(),
            lexicon: Arc::new(lexicon),
            negators: negators.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn english() -> Self {
        Self {
            name: "lexicon-en".to_string(),
            lexicon: LEXICON_EN.clone(),
            negators: NEGATORS_EN.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn arabic() -> Self {
        Self {
            name: "lexicon-ar".to_string(),
            lexicon: LEXICON_AR.clone(),
            negators: NEGATORS_AR.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Embedded lexicon for a language, if we ship one.
    pub fn builtin(language: &str) -> Option<Self> {
        match language {
            "en" => Some(Self::english()),
            "ar" => Some(Self::arabic()),
            _ => None,
        }
    }

    /// Load a `{"word": polarity}` JSON lexicon. No negators are attached.
    pub fn from_json_file(name: impl Into<String>, path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read lexicon {}", path.display()))?;
        let lexicon: HashMap<String, i32> = serde_json::from_str(&raw)
            .with_context(|| format!("parse lexicon {}", path.display()))?;
        Ok(Self::new(name, lexicon, &[]))
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *self.lexicon.get(w).unwrap_or(&0)
    }

    fn is_negator(&self, w: &str) -> bool {
        self.negators.contains(w)
    }

    /// Returns (score, lexicon hits, token count). A negator in the previous
    /// 1..=3 tokens flips the sign of a word's polarity.
    pub fn score_text(&self, text: &str) -> (i32, usize, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let base = self.word_score(&tokens[i]);
            if base == 0 {
                continue;
            }
            hits += 1;
            let negated =
                (1..=NEGATION_WINDOW).any(|k| i >= k && self.is_negator(&tokens[i - k]));
            score += if negated { -base } else { base };
        }

        (score, hits, tokens.len())
    }
}

/// Lowercased word tokens; apostrophes and Arabic diacritics are dropped so
/// "don't" matches "dont" and vocalized words match the bare lexicon entry.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || is_arabic_mark(c)))
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.chars()
                .filter(|c| *c != '\'' && !is_arabic_mark(*c))
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
}

/// Map a lexicon score onto a label and a confidence.
fn label_for(score: i32, hits: usize) -> (&'static str, f32) {
    match score {
        0 if hits == 0 => ("neutral", 0.6),
        0 => ("neutral", 0.5),
        s => {
            let conf = (0.55 + 0.1 * s.unsigned_abs() as f32).min(0.99);
            if s > 0 {
                ("positive", conf)
            } else {
                ("negative", conf)
            }
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconSentimentClassifier {
    async fn classify(&self, text: &str) -> anyhow::Result<RawSentiment> {
        let (score, hits, _tokens) = self.score_text(text);
        let (label, conf) = label_for(score, hits);
        Ok(RawSentiment {
            label: label.to_string(),
            score: conf,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
