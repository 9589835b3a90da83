// tests/pipeline_scenarios.rs
//
// End-to-end behaviour of the analysis orchestrator with controllable test
// doubles for the language classifier, sentiment models and keyword extractor.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use feedback_sentiment_analyzer::analyze::result::{ERR_INVALID_INPUT, ERR_LANGUAGE_MODEL};
use feedback_sentiment_analyzer::keywords::{FrequencyKeywordExtractor, KeywordExtractor};
use feedback_sentiment_analyzer::lang::{
    LanguageClassifier, LanguageCode, LanguagePrediction, ScriptLanguageClassifier,
};
use feedback_sentiment_analyzer::sentiment::{
    LexiconSentimentClassifier, RawSentiment, SentimentClassifier, SentimentLabel,
    SentimentResolver,
};
use feedback_sentiment_analyzer::store::{MemoryStore, ResultStore};
use feedback_sentiment_analyzer::{AnalysisOutcome, Analyzer, AnalyzerConfig, Registry};

/// Wraps the script classifier and counts calls.
#[derive(Default)]
struct CountingLanguage {
    inner: ScriptLanguageClassifier,
    calls: Mutex<usize>,
}

#[async_trait]
impl LanguageClassifier for CountingLanguage {
    async fn predict(&self, text: &str, k: usize) -> anyhow::Result<Vec<LanguagePrediction>> {
        *self.calls.lock() += 1;
        self.inner.predict(text, k).await
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Always answers with one fixed code.
struct FixedLanguage(&'static str);

#[async_trait]
impl LanguageClassifier for FixedLanguage {
    async fn predict(&self, _text: &str, _k: usize) -> anyhow::Result<Vec<LanguagePrediction>> {
        Ok(vec![LanguagePrediction::new(self.0, 0.99)])
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Records every text it is asked to score.
struct Recording {
    label: &'static str,
    score: f32,
    seen: Mutex<Vec<String>>,
}

impl Recording {
    fn new(label: &'static str, score: f32) -> Arc<Self> {
        Arc::new(Self {
            label,
            score,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SentimentClassifier for Recording {
    async fn classify(&self, text: &str) -> anyhow::Result<RawSentiment> {
        self.seen.lock().push(text.to_string());
        Ok(RawSentiment {
            label: self.label.to_string(),
            score: self.score,
        })
    }
    fn name(&self) -> &str {
        "recording"
    }
}

struct Exploding;

#[async_trait]
impl SentimentClassifier for Exploding {
    async fn classify(&self, _text: &str) -> anyhow::Result<RawSentiment> {
        Err(anyhow!("CUDA out of memory"))
    }
    fn name(&self) -> &str {
        "exploding"
    }
}

struct BrokenKeywords;

#[async_trait]
impl KeywordExtractor for BrokenKeywords {
    async fn extract(&self, _: &str, _: &LanguageCode, _: usize) -> anyhow::Result<Vec<String>> {
        Err(anyhow!("extractor unavailable"))
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

fn build(
    language: Option<Arc<dyn LanguageClassifier>>,
    sentiment: SentimentResolver,
    keywords: Arc<dyn KeywordExtractor>,
) -> (Analyzer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_capacity(100));
    let reg = Registry::new(language, sentiment, keywords);
    let analyzer = Analyzer::new(Arc::new(reg), store.clone(), &AnalyzerConfig::default());
    (analyzer, store)
}

fn lexicons() -> SentimentResolver {
    SentimentResolver::new()
        .with_model(LanguageCode::ar(), Arc::new(LexiconSentimentClassifier::arabic()))
        .with_model(LanguageCode::en(), Arc::new(LexiconSentimentClassifier::english()))
}

#[tokio::test]
async fn code_switched_gulf_comment_is_segmented_and_reconciled() {
    let (a, store) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        lexicons(),
        Arc::new(FrequencyKeywordExtractor::new()),
    );

    let out = a.analyze("نعم الخدمة كانت zain bs wait وايد").await;
    let r = out.result().expect("analysis result");

    assert_eq!(r.detected_language.as_str(), "ar");
    assert!(r.processed_text.contains("كثير"), "dialect not normalized: {}", r.processed_text);
    assert!(!r.processed_text.contains("وايد"));

    assert!(r.segments_analysis.len() >= 2);
    let langs: Vec<&str> = r
        .segments_analysis
        .iter()
        .map(|s| s.segment_lang.as_str())
        .collect();
    assert!(langs.contains(&"ar") && langs.contains(&"en"), "{langs:?}");

    assert!(matches!(
        r.sentiment,
        SentimentLabel::MixedPositive | SentimentLabel::MixedNegative | SentimentLabel::MixedNeutral
    ));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn segment_texts_reconstruct_the_token_stream() {
    let (a, _) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        lexicons(),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let raw = "الأكل كان بارد but the staff were very friendly شكرا";
    let out = a.analyze(raw).await;
    let r = out.result().unwrap();

    let joined = r
        .segments_analysis
        .iter()
        .map(|s| s.segment_text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let tokens = feedback_sentiment_analyzer::segment::tokenize(raw).join(" ");
    assert_eq!(joined, tokens);
    // the Arabic segment carries a negative word, so the composite is negative
    assert_eq!(r.sentiment, SentimentLabel::MixedNegative);
}

#[tokio::test]
async fn empty_comment_returns_error_without_classifier_calls() {
    let lang = Arc::new(CountingLanguage::default());
    let model = Recording::new("positive", 0.9);
    let (a, store) = build(
        Some(lang.clone()),
        SentimentResolver::new().with_model(LanguageCode::en(), model.clone()),
        Arc::new(FrequencyKeywordExtractor::new()),
    );

    let out = a.analyze("").await;
    assert_eq!(
        serde_json::to_value(&out).unwrap(),
        json!({"error": ERR_INVALID_INPUT, "original_text": ""})
    );
    assert_eq!(*lang.calls.lock(), 0);
    assert!(model.seen.lock().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn missing_language_model_is_a_structured_error() {
    let (a, _) = build(None, lexicons(), Arc::new(FrequencyKeywordExtractor::new()));
    let out = a.analyze("great service").await;
    let e = out.error().expect("error record");
    assert_eq!(e.error, ERR_LANGUAGE_MODEL);
    assert_eq!(e.original_text, json!("great service"));
}

#[tokio::test]
async fn unsupported_language_without_fallback() {
    let (a, _) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        lexicons(),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let out = a.analyze("ang ganda ng serbisyo po, salamat").await;
    let r = out.result().unwrap();
    assert_eq!(r.detected_language.as_str(), "tl");
    assert_eq!(r.sentiment, SentimentLabel::UnsupportedLang);
    assert_eq!(r.confidence, 0.0);
}

#[tokio::test]
async fn multilingual_fallback_scores_unregistered_language() {
    let fallback = Recording::new("positive", 0.777);
    let (a, _) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        lexicons().with_multilingual(fallback.clone()),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let out = a.analyze("ang ganda ng serbisyo po").await;
    let r = out.result().unwrap();
    assert_eq!(r.sentiment, SentimentLabel::Positive);
    assert_eq!(r.confidence, 0.78);
    assert_eq!(fallback.seen.lock().len(), 1);
}

#[tokio::test]
async fn failing_english_model_degrades_to_error_sentiment() {
    let (a, store) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        SentimentResolver::new().with_model(LanguageCode::en(), Arc::new(Exploding)),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let out = a.analyze("The delivery was late and the driver was rude").await;
    let r = out.result().expect("pipeline still completes");
    assert_eq!(r.sentiment, SentimentLabel::ErrorSentiment);
    assert_eq!(r.confidence, 0.0);
    assert_eq!(r.detected_language.as_str(), "en");
    assert!(r.keywords.contains(&"delivery".to_string()));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn keyword_failure_yields_empty_list() {
    let (a, _) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        lexicons(),
        Arc::new(BrokenKeywords),
    );
    let out = a.analyze("excellent food").await;
    let r = out.result().unwrap();
    assert!(r.keywords.is_empty());
    assert_eq!(r.sentiment, SentimentLabel::Positive);
}

#[tokio::test]
async fn monolingual_comment_uses_whole_comment_verdict() {
    let model = Recording::new("negative", 0.8123);
    let (a, _) = build(
        Some(Arc::new(FixedLanguage("en"))),
        SentimentResolver::new().with_model(LanguageCode::en(), model.clone()),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let out = a.analyze("Waited forever for a cold burger").await;
    let r = out.result().unwrap();
    assert!(r.segments_analysis.is_empty());
    assert_eq!(r.sentiment, SentimentLabel::Negative);
    assert_eq!(r.confidence, 0.81);
    // scored exactly once, on the cleaned text
    assert_eq!(*model.seen.lock(), vec!["waited forever for a cold burger".to_string()]);
}

#[tokio::test]
async fn mixed_script_with_non_segmentable_language_is_not_segmented() {
    let (a, _) = build(
        Some(Arc::new(FixedLanguage("ur"))),
        lexicons().with_multilingual(Recording::new("neutral", 0.5)),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let out = a.analyze("کھانا اچھا تھا but slow service").await;
    let r = out.result().unwrap();
    assert!(r.segments_analysis.is_empty());
    assert_eq!(r.sentiment, SentimentLabel::Neutral);
}

#[tokio::test]
async fn arabic_comment_is_dialect_normalized_before_scoring() {
    let ar = Recording::new("negative", 0.9);
    let (a, _) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        SentimentResolver::new().with_model(LanguageCode::ar(), ar.clone()),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let out = a.analyze("الخدمة مب زين!").await;
    let r = out.result().unwrap();
    assert_eq!(r.processed_text, "الخدمة ليس جيد");
    assert_eq!(*ar.seen.lock(), vec!["الخدمة ليس جيد".to_string()]);
}

#[tokio::test]
async fn batch_preserves_order_and_reports_bad_items_in_place() {
    let (a, store) = build(
        Some(Arc::new(ScriptLanguageClassifier::default())),
        lexicons(),
        Arc::new(FrequencyKeywordExtractor::new()),
    );
    let items: Vec<Value> = vec![
        json!("great staff"),
        json!(42),
        json!("   "),
        json!("terrible food"),
        Value::Null,
    ];
    let out = a.analyze_batch(&items).await;
    assert_eq!(out.len(), items.len());

    assert_eq!(out[0].result().unwrap().sentiment, SentimentLabel::Positive);
    assert_eq!(out[1].error().unwrap().original_text, json!(42));
    assert_eq!(out[2].error().unwrap().error, ERR_INVALID_INPUT);
    assert_eq!(out[3].result().unwrap().sentiment, SentimentLabel::Negative);
    assert!(matches!(out[4], AnalysisOutcome::Failed(_)));

    let recent = store.load_recent(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].result.original_text, "terrible food");
}
