// src/analyze/result.rs
//! Records produced by the analysis pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lang::LanguageCode;
use crate::sentiment::SentimentLabel;

pub const ERR_INVALID_INPUT: &str = "Invalid comment input";
pub const ERR_LANGUAGE_MODEL: &str = "Language model not loaded";

/// Sentiment of one language segment of a code-switched comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub segment_text: String,
    pub segment_lang: LanguageCode,
    pub segment_sentiment: SentimentLabel,
    pub segment_confidence: f32,
}

/// One analyzed comment. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub original_text: String,
    pub processed_text: String,
    pub detected_language: LanguageCode,
    pub sentiment: SentimentLabel,
    pub confidence: f32,
    pub keywords: Vec<String>,
    /// Empty unless the comment mixed scripts and split into 2+ spans.
    pub segments_analysis: Vec<SegmentResult>,
}

impl AnalysisResult {
    pub fn is_segmented(&self) -> bool {
        !self.segments_analysis.is_empty()
    }
}

/// Structured per-comment failure; `original_text` echoes the input as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub error: String,
    pub original_text: Value,
}

impl AnalysisError {
    pub fn invalid_input(original: Value) -> Self {
        Self {
            error: ERR_INVALID_INPUT.to_string(),
            original_text: original,
        }
    }

    pub fn language_model_missing(original: &str) -> Self {
        Self {
            error: ERR_LANGUAGE_MODEL.to_string(),
            original_text: Value::String(original.to_string()),
        }
    }
}

/// Either a full analysis or a structured error. Serialized untagged, so the
/// wire shape is the inner record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Analyzed(AnalysisResult),
    Failed(AnalysisError),
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Analyzed(r) => Some(r),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            Self::Analyzed(_) => None,
            Self::Failed(e) => Some(e),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
