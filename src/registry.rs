// src/registry.rs
//! Load-once model registry: language classifier, sentiment models and keyword
//! extractor. Built at startup, shared read-only behind an `Arc`.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::config::{AnalyzerConfig, ModelKind, ModelSpec};
use crate::keywords::{FrequencyKeywordExtractor, KeywordExtractor};
use crate::lang::{LanguageClassifier, LanguageCode, ScriptLanguageClassifier};
use crate::sentiment::{
    HttpSentimentClassifier, LexiconSentimentClassifier, SentimentClassifier, SentimentResolver,
};

pub struct Registry {
    language: Option<Arc<dyn LanguageClassifier>>,
    sentiment: SentimentResolver,
    keywords: Arc<dyn KeywordExtractor>,
}

impl Registry {
    pub fn new(
        language: Option<Arc<dyn LanguageClassifier>>,
        sentiment: SentimentResolver,
        keywords: Arc<dyn KeywordExtractor>,
    ) -> Self {
        Self {
            language,
            sentiment,
            keywords,
        }
    }

    /// Build every configured model. Any construction error aborts startup.
    pub fn from_config(cfg: &AnalyzerConfig) -> anyhow::Result<Self> {
        let language: Option<Arc<dyn LanguageClassifier>> = if cfg.language.enabled {
            Some(Arc::new(ScriptLanguageClassifier::new(
                cfg.language.min_confidence,
            )))
        } else {
            None
        };

        let mut sentiment = SentimentResolver::new();
        for (lang, spec) in &cfg.sentiment.models {
            let code = LanguageCode::new(lang);
            let model = build_sentiment_model(code.as_str(), spec)
                .with_context(|| format!("sentiment model for `{lang}`"))?;
            sentiment = sentiment.with_model(code, model);
        }
        if let Some(spec) = &cfg.sentiment.multilingual {
            let model = build_sentiment_model("multilingual", spec)
                .context("multilingual sentiment model")?;
            sentiment = sentiment.with_multilingual(model);
        }

        let reg = Self::new(language, sentiment, Arc::new(FrequencyKeywordExtractor::new()));
        info!(
            language_model = reg.language.as_ref().map(|l| l.name()).unwrap_or("none"),
            sentiment_languages = ?reg.sentiment.languages(),
            multilingual = reg.sentiment.has_multilingual(),
            keywords = reg.keywords.name(),
            "model registry loaded"
        );
        Ok(reg)
    }

    pub fn language(&self) -> Option<&dyn LanguageClassifier> {
        self.language.as_deref()
    }

    pub fn sentiment(&self) -> &SentimentResolver {
        &self.sentiment
    }

    pub fn keywords(&self) -> &dyn KeywordExtractor {
        self.keywords.as_ref()
    }
}

fn build_sentiment_model(name: &str, spec: &ModelSpec) -> anyhow::Result<Arc<dyn SentimentClassifier>> {
    match spec.kind {
        ModelKind::Lexicon => {
            let model = match &spec.lexicon {
                Some(path) => LexiconSentimentClassifier::from_json_file(format!("lexicon-{name}"), path)?,
                None => LexiconSentimentClassifier::builtin(name).ok_or_else(|| {
                    anyhow::anyhow!("no embedded lexicon for `{name}`; set `lexicon = <path>`")
                })?,
            };
            Ok(Arc::new(model))
        }
        ModelKind::Http => {
            let url = spec
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("http model `{name}` has no url"))?;
            let model = HttpSentimentClassifier::new(
                format!("http-{name}"),
                url,
                spec.api_key_env.as_deref(),
            )?;
            Ok(Arc::new(model))
        }
    }
}
