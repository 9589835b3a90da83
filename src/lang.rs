// src/lang.rs
//! Language identification: bare language codes, Unicode script helpers, the
//! `LanguageClassifier` collaborator trait and a built-in script classifier.
//!
//! Classifiers may speak in fastText-style labels (`__label__ar`). Decoding
//! happens here, so the rest of the crate only ever sees bare codes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Prefix used by fastText-style language models.
pub const LABEL_PREFIX: &str = "__label__";

/// Default number of ranked predictions requested from a classifier.
pub const DEFAULT_TOP_K: usize = 1;

/// Bare, lowercase language code (`ar`, `en`, `ur`, `tl`, `und`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub const UND: &'static str = "und";
    pub const AR: &'static str = "ar";
    pub const EN: &'static str = "en";
    pub const UR: &'static str = "ur";
    pub const TL: &'static str = "tl";

    /// Build from any classifier output: prefix stripped, trimmed, lowercased.
    /// Blank input becomes `und`.
    pub fn new(raw: &str) -> Self {
        let code = strip_label_prefix(raw).trim().to_lowercase();
        if code.is_empty() {
            Self::und()
        } else {
            Self(code)
        }
    }

    pub fn und() -> Self {
        Self(Self::UND.to_string())
    }

    pub fn ar() -> Self {
        Self(Self::AR.to_string())
    }

    pub fn en() -> Self {
        Self(Self::EN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_und(&self) -> bool {
        self.0 == Self::UND
    }

    /// Arabic macro-language, including regional variants (`arz`, `afb`, `ar-ae`...).
    pub fn is_arabic_family(&self) -> bool {
        let c = self.0.as_str();
        c == Self::AR
            || c.starts_with("ar-")
            || c.starts_with("ar_")
            || matches!(
                c,
                "arb" | "arz" | "afb" | "apc" | "ajp" | "acm" | "ary" | "arq" | "aeb" | "ayl"
            )
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::und()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Strip a classifier-specific label prefix, if present.
pub fn strip_label_prefix(raw: &str) -> &str {
    raw.strip_prefix(LABEL_PREFIX).unwrap_or(raw)
}

/// One ranked prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePrediction {
    pub code: LanguageCode,
    pub score: f32,
}

impl LanguagePrediction {
    pub fn new(code: impl Into<LanguageCode>, score: f32) -> Self {
        Self {
            code: code.into(),
            score,
        }
    }
}

/// Language identification collaborator. Implementations must return bare
/// codes, best first, at most `k` entries.
#[async_trait]
pub trait LanguageClassifier: Send + Sync {
    async fn predict(&self, text: &str, k: usize) -> anyhow::Result<Vec<LanguagePrediction>>;

    fn name(&self) -> &'static str;
}

/// Top-1 detection. Blank text, an empty prediction list or a classifier error
/// all resolve to `und` (errors are logged, never propagated).
pub async fn detect(classifier: &dyn LanguageClassifier, text: &str) -> (LanguageCode, f32) {
    let text = text.trim();
    if text.is_empty() {
        return (LanguageCode::und(), 0.0);
    }
    match classifier.predict(text, DEFAULT_TOP_K).await {
        Ok(preds) => preds
            .into_iter()
            .next()
            .map(|p| (p.code, p.score))
            .unwrap_or_else(|| (LanguageCode::und(), 0.0)),
        Err(e) => {
            warn!(error = ?e, classifier = classifier.name(), "language prediction failed");
            (LanguageCode::und(), 0.0)
        }
    }
}

// ------------------------------------------------------------
// Script helpers
// ------------------------------------------------------------

/// Arabic Unicode blocks (base, supplement, extended-A, presentation forms).
pub fn is_arabic_char(ch: char) -> bool {
    matches!(ch as u32,
        0x0600..=0x06FF
        | 0x0750..=0x077F
        | 0x08A0..=0x08FF
        | 0xFB50..=0xFDFF
        | 0xFE70..=0xFEFF
    )
}

/// Basic Latin letter (`a-z`, `A-Z`).
pub fn is_latin_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Arabic harakat and other combining marks that sit on Arabic letters.
pub fn is_arabic_mark(ch: char) -> bool {
    matches!(ch as u32, 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06ED)
}

pub fn has_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

pub fn has_latin(text: &str) -> bool {
    text.chars().any(is_latin_letter)
}

/// True when every character is a Latin letter (and there is at least one).
pub fn is_latin_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_latin_letter)
}

// ------------------------------------------------------------
// Built-in script classifier
// ------------------------------------------------------------

/// Letters used in Urdu orthography but not in Arabic.
const URDU_LETTERS: &[char] = &[
    '\u{0679}', // ٹ
    '\u{0688}', // ڈ
    '\u{0691}', // ڑ
    '\u{06BA}', // ں
    '\u{06BE}', // ھ
    '\u{06C1}', // ہ
    '\u{06D2}', // ے
    '\u{06D3}', // ۓ
];

/// High-frequency Tagalog function words.
const TAGALOG_HINTS: &[&str] = &[
    "ang", "ng", "mga", "sa", "po", "hindi", "ako", "ikaw", "siya", "ay", "salamat", "maganda",
    "ito", "yung", "naman", "talaga", "pero", "lang", "kasi", "masarap",
];

/// Script-statistics classifier: Arabic block vs Latin letters, with Urdu
/// letters and Tagalog function words as tie-breakers inside each script.
///
/// Produces fastText-style labels internally and decodes them in `predict`.
#[derive(Debug, Clone)]
pub struct ScriptLanguageClassifier {
    min_confidence: f32,
}

impl Default for ScriptLanguageClassifier {
    fn default() -> Self {
        Self::new(0.4)
    }
}

impl ScriptLanguageClassifier {
    pub fn new(min_confidence: f32) -> Self {
        Self {
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    /// Ranked `(label, score)` pairs with the `__label__` prefix attached.
    fn raw_predictions(&self, text: &str) -> Vec<(String, f32)> {
        let mut arabic = 0usize;
        let mut urdu = 0usize;
        let mut latin = 0usize;
        let mut letters = 0usize;

        for ch in text.chars() {
            if !ch.is_alphabetic() {
                continue;
            }
            letters += 1;
            if is_arabic_char(ch) {
                arabic += 1;
                if URDU_LETTERS.contains(&ch) {
                    urdu += 1;
                }
            } else if is_latin_letter(ch) {
                latin += 1;
            }
        }

        if letters == 0 {
            return vec![(format!("{LABEL_PREFIX}{}", LanguageCode::UND), 1.0)];
        }

        let arabic_ratio = arabic as f32 / letters as f32;
        let latin_ratio = latin as f32 / letters as f32;

        let mut out = Vec::with_capacity(4);

        if arabic > 0 {
            let ur_share = ((urdu as f32 * 3.0) / arabic as f32).min(1.0);
            out.push((LanguageCode::UR, arabic_ratio * ur_share));
            out.push((LanguageCode::AR, arabic_ratio * (1.0 - ur_share)));
        }

        if latin > 0 {
            let words: Vec<String> = text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| is_latin_word(w))
                .map(|w| w.to_ascii_lowercase())
                .collect();
            let hits = words
                .iter()
                .filter(|w| TAGALOG_HINTS.contains(&w.as_str()))
                .count();
            let tl_share = if words.is_empty() {
                0.0
            } else {
                ((hits as f32 * 2.0) / words.len() as f32).min(1.0)
            };
            out.push((LanguageCode::TL, latin_ratio * tl_share));
            out.push((LanguageCode::EN, latin_ratio * (1.0 - tl_share)));
        }

        let mut out: Vec<(String, f32)> = out
            .into_iter()
            .filter(|(_, s)| *s > 0.0)
            .map(|(code, s)| (format!("{LABEL_PREFIX}{code}"), s))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));

        if out.is_empty() {
            // Letters outside both scripts (Cyrillic, CJK, ...).
            out.push((format!("{LABEL_PREFIX}{}", LanguageCode::UND), 1.0 - arabic_ratio - latin_ratio));
        }
        out
    }
}

#[async_trait]
impl LanguageClassifier for ScriptLanguageClassifier {
    async fn predict(&self, text: &str, k: usize) -> anyhow::Result<Vec<LanguagePrediction>> {
        let raw = self.raw_predictions(text);
        let top = raw.first().map(|(_, s)| *s).unwrap_or(0.0);
        if top < self.min_confidence {
            return Ok(vec![LanguagePrediction::new(LanguageCode::UND, top)]);
        }
        Ok(raw
            .into_iter()
            .take(k.max(1))
            .map(|(label, score)| LanguagePrediction::new(LanguageCode::new(&label), score))
            .collect())
    }

    fn name(&self) -> &'static str {
        "script"
    }
}
