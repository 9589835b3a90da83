// src/segment.rs
//! Code-switching segmenter.
//!
//! Splits a comment into contiguous, language-homogeneous spans:
//! 1. tokenize the original text (Unicode word runs),
//! 2. ask the language classifier about every token,
//! 3. apply short-token gating and the Latin-script override,
//! 4. greedily group tokens left to right, letting undefined tokens inherit the
//!    open segment's language.
//!
//! Steps 3–4 are pure (`resolve_token_language`, `group_tokens`) so they can be
//! exercised without a classifier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::lang::{self, has_arabic, has_latin, is_latin_word, LanguageClassifier, LanguageCode};

/// Tokens at or below this many characters are too short for language ID.
pub const DEFAULT_SHORT_TOKEN_MAX_LEN: usize = 2;

/// Common English sentiment / service-domain words. A Latin token found here is
/// always English, whatever the classifier thought.
pub const ENGLISH_DOMAIN_WHITELIST: &[&str] = &[
    "nice", "good", "bad", "great", "service", "staff", "fast", "slow", "food", "price",
    "delivery", "order", "wait", "waiting", "thanks", "thank", "very", "not", "love", "hate",
    "ok", "okay", "excellent", "poor", "clean", "dirty", "rude", "friendly", "late", "quick",
    "best", "worst", "app", "support", "quality", "cheap", "expensive", "fresh", "cold", "hot",
];

static WHITELIST: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_DOMAIN_WHITELIST.iter().copied().collect());

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\w+").expect("word regex"));

/// A contiguous run of tokens tagged with one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub language: LanguageCode,
}

/// Word tokens of the original text, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Cheap necessary condition for segmentation: a segmentable detected
/// language and both Latin and Arabic characters in the original text.
pub fn should_segment(
    detected: &LanguageCode,
    original: &str,
    segmentable: &[LanguageCode],
) -> bool {
    segmentable.contains(detected) && has_latin(original) && has_arabic(original)
}

/// Short tokens are unreliable for language ID: force `und`.
pub fn gate_short_token(token: &str, predicted: LanguageCode, max_len: usize) -> LanguageCode {
    if token.chars().count() <= max_len {
        LanguageCode::und()
    } else {
        predicted
    }
}

pub fn is_whitelisted_english(token: &str) -> bool {
    WHITELIST.contains(token.to_ascii_lowercase().as_str())
}

/// Latin-only tokens longer than one character: whitelisted words become `en`;
/// otherwise an undecided Latin spelling defaults to `en`.
pub fn apply_latin_override(token: &str, current: LanguageCode) -> LanguageCode {
    if !is_latin_word(token) || token.chars().count() <= 1 {
        return current;
    }
    if is_whitelisted_english(token) {
        return LanguageCode::en();
    }
    if current.is_und() {
        return LanguageCode::en();
    }
    current
}

/// Gating followed by the Latin override. Context inheritance happens later,
/// during grouping.
pub fn resolve_token_language(token: &str, predicted: LanguageCode, max_len: usize) -> LanguageCode {
    apply_latin_override(token, gate_short_token(token, predicted, max_len))
}

/// Greedy one-pass grouping of `(token, resolved language)` pairs into spans.
pub fn group_tokens(tokens: &[(String, LanguageCode)]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut open: Vec<&str> = Vec::new();
    let mut open_lang: Option<LanguageCode> = None;

    for (tok, lang) in tokens {
        match &open_lang {
            None => {
                open.push(tok);
                open_lang = Some(lang.clone());
            }
            // `und` inherits whatever the open segment already carries
            Some(cur) if lang == cur || lang.is_und() => open.push(tok),
            Some(cur) => {
                spans.push(Span {
                    text: open.join(" "),
                    language: cur.clone(),
                });
                open.clear();
                open.push(tok);
                open_lang = Some(lang.clone());
            }
        }
    }

    if let Some(lang) = open_lang {
        spans.push(Span {
            text: open.join(" "),
            language: lang,
        });
    }
    spans
}

/// Segmenter with its token-length threshold.
#[derive(Debug, Clone)]
pub struct Segmenter {
    short_token_max_len: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_TOKEN_MAX_LEN)
    }
}

impl Segmenter {
    pub fn new(short_token_max_len: usize) -> Self {
        Self {
            short_token_max_len,
        }
    }

    /// Per-token resolved languages, before context inheritance.
    pub async fn label_tokens(
        &self,
        text: &str,
        classifier: &dyn LanguageClassifier,
    ) -> Vec<(String, LanguageCode)> {
        let mut out = Vec::new();
        for tok in tokenize(text) {
            let (predicted, _score) = lang::detect(classifier, &tok).await;
            let resolved = resolve_token_language(&tok, predicted, self.short_token_max_len);
            out.push((tok, resolved));
        }
        out
    }

    pub async fn segment(&self, text: &str, classifier: &dyn LanguageClassifier) -> Vec<Span> {
        let labelled = self.label_tokens(text, classifier).await;
        group_tokens(&labelled)
    }
}
