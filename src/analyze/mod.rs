// src/analyze/mod.rs
//! Analysis pipeline entry: one comment in, one `AnalysisOutcome` out.
//!
//! Order:
//! 1) validate input, require the language model
//! 2) clean, detect language, normalize dialect (Arabic family)
//! 3) whole-comment sentiment, keywords
//! 4) for mixed-script comments: segment, score segments, reconcile
//!
//! Nothing downstream can abort the pipeline: failures become sentinel labels
//! or empty keyword lists.

pub mod result;

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::lang::{self, LanguageCode};
use crate::metrics;
use crate::normalize::{clean, normalize_dialect};
use crate::registry::Registry;
use crate::segment::{should_segment, Segmenter};
use crate::sentiment::{reconcile, SentimentLabel, SentimentVerdict};
use crate::store::ResultStore;

pub use result::{AnalysisError, AnalysisOutcome, AnalysisResult, SegmentResult};

/// Anonymized id for logs: first 6 bytes of sha256, hex. Raw text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// The orchestrator. Holds the read-only registry and the result store.
pub struct Analyzer {
    registry: Arc<Registry>,
    store: Arc<dyn ResultStore>,
    segmenter: Segmenter,
    segmentable: Vec<LanguageCode>,
    top_n: usize,
}

impl Analyzer {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn ResultStore>, cfg: &AnalyzerConfig) -> Self {
        Self {
            registry,
            store,
            segmenter: Segmenter::new(cfg.segmenter.short_token_max_len),
            segmentable: cfg.segmentable_languages(),
            top_n: cfg.keywords.top_n,
        }
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Analyze one raw comment and hand a successful result to the store.
    pub async fn analyze(&self, raw: &str) -> AnalysisOutcome {
        let outcome = self.run(raw).await;
        if let AnalysisOutcome::Analyzed(res) = &outcome {
            if !self.store.save(res) {
                metrics::record_store_failure();
            }
        }
        outcome
    }

    /// Batch entry: one outcome per item, in input order. Non-string items are
    /// reported in place without touching the pipeline.
    pub async fn analyze_batch(&self, items: &[Value]) -> Vec<AnalysisOutcome> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(self.analyze_value(item).await);
        }
        out
    }

    /// JSON-level entry used by the HTTP layer.
    pub async fn analyze_value(&self, item: &Value) -> AnalysisOutcome {
        match item {
            Value::String(s) => self.analyze(s).await,
            other => {
                metrics::record_invalid_input();
                AnalysisOutcome::Failed(AnalysisError::invalid_input(other.clone()))
            }
        }
    }

    async fn run(&self, raw: &str) -> AnalysisOutcome {
        // RECEIVED
        if raw.trim().is_empty() {
            metrics::record_invalid_input();
            return AnalysisOutcome::Failed(AnalysisError::invalid_input(Value::String(
                raw.to_string(),
            )));
        }
        let Some(lang_model) = self.registry.language() else {
            warn!("analysis requested without a language model");
            metrics::record_invalid_input();
            return AnalysisOutcome::Failed(AnalysisError::language_model_missing(raw));
        };

        let started = Instant::now();
        let id = anon_hash(raw);

        // CLEANED
        let cleaned = clean(raw);
        debug!(%id, state = "CLEANED", len = cleaned.chars().count());
        if cleaned.is_empty() {
            // Nothing left to score (only URLs, mentions, punctuation...).
            let res = AnalysisResult {
                original_text: raw.to_string(),
                processed_text: cleaned,
                detected_language: LanguageCode::und(),
                sentiment: SentimentLabel::Unknown,
                confidence: 0.0,
                keywords: Vec::new(),
                segments_analysis: Vec::new(),
            };
            metrics::record_analysis(started.elapsed().as_secs_f64() * 1000.0, false);
            return AnalysisOutcome::Analyzed(res);
        }

        // LANGUAGE_DETECTED
        let (detected, lang_conf) = lang::detect(lang_model, &cleaned).await;
        debug!(%id, state = "LANGUAGE_DETECTED", lang = %detected, confidence = lang_conf);

        // DIALECT_NORMALIZED
        let processed = if detected.is_arabic_family() {
            let p = normalize_dialect(&cleaned);
            debug!(%id, state = "DIALECT_NORMALIZED", changed = (p != cleaned));
            p
        } else {
            cleaned
        };

        // SENTIMENT_SCORED
        let whole = self.registry.sentiment().resolve(&processed, &detected).await;
        debug!(%id, state = "SENTIMENT_SCORED", label = %whole.label, confidence = whole.confidence);

        // KEYWORDS_EXTRACTED
        let keywords = match self
            .registry
            .keywords()
            .extract(&processed, &detected, self.top_n)
            .await
        {
            Ok(k) => k,
            Err(e) => {
                warn!(%id, error = ?e, "keyword extraction failed");
                metrics::record_stage_failure("keywords");
                Vec::new()
            }
        };
        debug!(%id, state = "KEYWORDS_EXTRACTED", count = keywords.len());

        let mut sentiment = whole.label;
        let confidence = whole.confidence;
        let mut segments_analysis = Vec::new();

        // SEGMENTED -> SEGMENT_SCORED -> RECONCILED
        if should_segment(&detected, raw, &self.segmentable) {
            let spans = self.segmenter.segment(raw, lang_model).await;
            debug!(%id, state = "SEGMENTED", spans = spans.len());

            if spans.len() > 1 {
                let mut verdicts: Vec<SentimentVerdict> = Vec::with_capacity(spans.len());
                for span in spans {
                    let v = self
                        .registry
                        .sentiment()
                        .resolve_segment(&span.text, &span.language)
                        .await;
                    segments_analysis.push(SegmentResult {
                        segment_text: span.text,
                        segment_lang: span.language,
                        segment_sentiment: v.label.clone(),
                        segment_confidence: v.confidence,
                    });
                    verdicts.push(v);
                }
                debug!(%id, state = "SEGMENT_SCORED", segments = verdicts.len());

                // Segment evidence overrides the whole-text label.
                sentiment = reconcile(&verdicts);
                debug!(%id, state = "RECONCILED", label = %sentiment);
            }
        }

        let res = AnalysisResult {
            original_text: raw.to_string(),
            processed_text: processed,
            detected_language: detected,
            sentiment,
            confidence,
            keywords,
            segments_analysis,
        };
        metrics::record_analysis(
            started.elapsed().as_secs_f64() * 1000.0,
            res.is_segmented(),
        );
        debug!(%id, state = "DONE");
        AnalysisOutcome::Analyzed(res)
    }
}
