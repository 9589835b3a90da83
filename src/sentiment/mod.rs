// src/sentiment/mod.rs
//! Sentiment labels, per-language model selection and composite reconciliation.

pub mod lexicon;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::lang::LanguageCode;
use crate::normalize::normalize_dialect;

pub use lexicon::LexiconSentimentClassifier;
pub use remote::HttpSentimentClassifier;

/// Sentiment label: model labels plus synthesized composite and sentinel values.
/// Serialized as its upper-case name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    MixedPositive,
    MixedNegative,
    MixedNeutral,
    Unknown,
    ErrorSentiment,
    ErrorMultilingual,
    UnsupportedLang,
    UnsupportedSegLang,
    /// Any other label a model emits, upper-cased.
    Other(String),
}

impl SentimentLabel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::MixedPositive => "MIXED_POSITIVE",
            Self::MixedNegative => "MIXED_NEGATIVE",
            Self::MixedNeutral => "MIXED_NEUTRAL",
            Self::Unknown => "UNKNOWN",
            Self::ErrorSentiment => "ERROR_SENTIMENT",
            Self::ErrorMultilingual => "ERROR_MULTILINGUAL",
            Self::UnsupportedLang => "UNSUPPORTED_LANG",
            Self::UnsupportedSegLang => "UNSUPPORTED_SEG_LANG",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Map a raw model label (any case) onto the label domain.
    pub fn from_model_label(raw: &str) -> Self {
        let up = raw.trim().to_uppercase();
        match up.as_str() {
            "POSITIVE" | "POS" => Self::Positive,
            "NEGATIVE" | "NEG" => Self::Negative,
            "NEUTRAL" | "NEU" => Self::Neutral,
            "MIXED_POSITIVE" => Self::MixedPositive,
            "MIXED_NEGATIVE" => Self::MixedNegative,
            "MIXED_NEUTRAL" => Self::MixedNeutral,
            "UNKNOWN" => Self::Unknown,
            "ERROR_SENTIMENT" => Self::ErrorSentiment,
            "ERROR_MULTILINGUAL" => Self::ErrorMultilingual,
            "UNSUPPORTED_LANG" => Self::UnsupportedLang,
            "UNSUPPORTED_SEG_LANG" => Self::UnsupportedSegLang,
            _ => Self::Other(up),
        }
    }

    /// Reserved non-model values signalling a degraded stage.
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Self::Unknown
                | Self::ErrorSentiment
                | Self::ErrorMultilingual
                | Self::UnsupportedLang
                | Self::UnsupportedSegLang
        )
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(s: String) -> Self {
        Self::from_model_label(&s)
    }
}

impl From<SentimentLabel> for String {
    fn from(l: SentimentLabel) -> Self {
        l.as_str().to_string()
    }
}

/// Label plus confidence in [0,1], rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub label: SentimentLabel,
    pub confidence: f32,
}

impl SentimentVerdict {
    pub fn new(label: SentimentLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: round2(confidence),
        }
    }

    pub fn sentinel(label: SentimentLabel) -> Self {
        Self {
            label,
            confidence: 0.0,
        }
    }
}

/// Clamp to [0,1] and round to 2 decimal places.
pub fn round2(x: f32) -> f32 {
    if !x.is_finite() {
        return 0.0;
    }
    (x.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// What a sentiment model returns for one input: exactly one label/score.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentiment {
    pub label: String,
    pub score: f32,
}

/// Sentiment model collaborator. One verdict for the whole input string.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> anyhow::Result<RawSentiment>;

    fn name(&self) -> &str;
}

/// Whether a verdict describes a whole comment or one segment of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Comment,
    Segment,
}

/// Per-language classifiers plus an optional multilingual fallback.
/// Built once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct SentimentResolver {
    models: HashMap<LanguageCode, Arc<dyn SentimentClassifier>>,
    multilingual: Option<Arc<dyn SentimentClassifier>>,
}

impl SentimentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, language: LanguageCode, model: Arc<dyn SentimentClassifier>) -> Self {
        self.models.insert(language, model);
        self
    }

    pub fn with_multilingual(mut self, model: Arc<dyn SentimentClassifier>) -> Self {
        self.multilingual = Some(model);
        self
    }

    pub fn has_model(&self, language: &LanguageCode) -> bool {
        self.models.contains_key(language)
    }

    pub fn languages(&self) -> Vec<&LanguageCode> {
        let mut v: Vec<_> = self.models.keys().collect();
        v.sort();
        v
    }

    pub fn has_multilingual(&self) -> bool {
        self.multilingual.is_some()
    }

    /// Whole-comment resolution.
    pub async fn resolve(&self, text: &str, language: &LanguageCode) -> SentimentVerdict {
        self.resolve_scoped(text, language, Scope::Comment).await
    }

    /// Segment resolution (unsupported languages report `UNSUPPORTED_SEG_LANG`).
    pub async fn resolve_segment(&self, text: &str, language: &LanguageCode) -> SentimentVerdict {
        self.resolve_scoped(text, language, Scope::Segment).await
    }

    pub async fn resolve_scoped(
        &self,
        text: &str,
        language: &LanguageCode,
        scope: Scope,
    ) -> SentimentVerdict {
        // Arabic family: normalize dialect and pin the Arabic model.
        let (text, key) = if language.is_arabic_family() {
            (normalize_dialect(text), LanguageCode::ar())
        } else {
            (text.to_string(), language.clone())
        };

        if let Some(model) = self.models.get(&key) {
            return match model.classify(&text).await {
                Ok(raw) => to_verdict(raw),
                Err(e) => {
                    warn!(error = ?e, model = model.name(), lang = %key, "sentiment classifier failed");
                    crate::metrics::record_stage_failure("sentiment");
                    SentimentVerdict::sentinel(SentimentLabel::ErrorSentiment)
                }
            };
        }

        if let Some(model) = &self.multilingual {
            return match model.classify(&text).await {
                Ok(raw) => to_verdict(raw),
                Err(e) => {
                    warn!(error = ?e, model = model.name(), lang = %key, "multilingual sentiment classifier failed");
                    crate::metrics::record_stage_failure("sentiment_multilingual");
                    SentimentVerdict::sentinel(SentimentLabel::ErrorMultilingual)
                }
            };
        }

        SentimentVerdict::sentinel(match scope {
            Scope::Comment => SentimentLabel::UnsupportedLang,
            Scope::Segment => SentimentLabel::UnsupportedSegLang,
        })
    }
}

fn to_verdict(raw: RawSentiment) -> SentimentVerdict {
    SentimentVerdict::new(SentimentLabel::from_model_label(&raw.label), raw.score)
}

/// Fold segment verdicts into one composite label:
/// any negative wins; otherwise positive without neutral; otherwise neutral.
/// Sentinel verdicts are ignored.
pub fn reconcile(verdicts: &[SentimentVerdict]) -> SentimentLabel {
    let labels: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.label.is_sentinel())
        .map(|v| v.label.as_str().to_lowercase())
        .collect();

    let has = |l: &str| labels.iter().any(|x| x == l);

    if has("negative") {
        SentimentLabel::MixedNegative
    } else if has("positive") && !has("neutral") {
        SentimentLabel::MixedPositive
    } else {
        SentimentLabel::MixedNeutral
    }
}
