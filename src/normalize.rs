// src/normalize.rs
//! Text normalization: comment cleaning, Gulf-dialect rewriting and stopword
//! lookups. All functions are pure; tables are embedded and loaded once.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::lang::LanguageCode;

/// Gulf dialect token -> standard-register Arabic. Many-to-one; canonical
/// values never appear as keys.
static DIALECT_TABLE: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let raw = include_str!("../data/dialect_gulf.json");
    serde_json::from_str::<HashMap<String, String>>(raw).unwrap_or_default()
});

static STOPWORDS_EN: Lazy<HashSet<String>> = Lazy::new(|| {
    let raw = include_str!("../data/stopwords_en.json");
    serde_json::from_str::<HashSet<String>>(raw).unwrap_or_default()
});

static STOPWORDS_AR: Lazy<HashSet<String>> = Lazy::new(|| {
    let raw = include_str!("../data/stopwords_ar.json");
    serde_json::from_str::<HashSet<String>>(raw).unwrap_or_default()
});

fn re_url() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("url regex"))
}

fn re_mention() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"@\w+").expect("mention regex"))
}

fn re_punct() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation regex"))
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// Clean a raw comment: lowercase, drop URLs, `@mentions` and `#`, remove
/// punctuation/symbols, collapse whitespace, trim. Never fails; may return "".
pub fn clean(text: &str) -> String {
    // 1) Case folding
    let mut out = text.to_lowercase();

    // 2) URLs and mentions are removed as whole tokens
    out = re_url().replace_all(&out, " ").into_owned();
    out = re_mention().replace_all(&out, " ").into_owned();

    // 3) Bare '#' only; the hashtag word survives
    out = out.replace('#', "");

    // 4) Punctuation and symbols (Latin and Arabic alike, emoji included)
    out = re_punct().replace_all(&out, "").into_owned();

    // 5) Collapse whitespace
    out = re_ws().replace_all(&out, " ").into_owned();
    out.trim().to_string()
}

/// Rewrite known dialect tokens to their standard form. Exact-token,
/// case-sensitive lookup; unmapped tokens pass through. Idempotent.
pub fn normalize_dialect(text: &str) -> String {
    text.split_whitespace()
        .map(|tok| {
            DIALECT_TABLE
                .get(tok)
                .map(String::as_str)
                .unwrap_or(tok)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical form of a single dialect token, if it has one.
pub fn dialect_canonical(token: &str) -> Option<&'static str> {
    DIALECT_TABLE.get(token).map(String::as_str)
}

/// Stopword lookup for the languages we carry lists for. Unknown languages
/// have no stopwords.
pub fn is_stopword(language: &LanguageCode, token: &str) -> bool {
    if language.is_arabic_family() {
        STOPWORDS_AR.contains(token)
    } else if language.as_str() == LanguageCode::EN {
        STOPWORDS_EN.contains(token)
    } else {
        false
    }
}
