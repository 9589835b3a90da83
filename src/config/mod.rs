// src/config/mod.rs
//! Analyzer configuration, loaded from TOML with env overrides.
//!
//! Path: `FEEDBACK_CONFIG_PATH` or `config/analyzer.toml`. A missing file at the
//! default path means "use defaults"; a missing file at an explicit path is an error.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::keywords::DEFAULT_TOP_N;
use crate::lang::LanguageCode;
use crate::segment::DEFAULT_SHORT_TOKEN_MAX_LEN;

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";
pub const ENV_CONFIG_PATH: &str = "FEEDBACK_CONFIG_PATH";
pub const ENV_KEYWORDS_TOP_N: &str = "FEEDBACK_KEYWORDS_TOP_N";

const MAX_TOP_N: usize = 50;

fn default_min_confidence() -> f32 {
    0.4
}
fn default_segmentable() -> Vec<String> {
    vec![LanguageCode::AR.to_string(), LanguageCode::EN.to_string()]
}
fn default_short_token_max_len() -> usize {
    DEFAULT_SHORT_TOKEN_MAX_LEN
}
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_store_capacity() -> usize {
    2000
}
fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub language: LanguageSection,
    #[serde(default)]
    pub segmenter: SegmenterSection,
    #[serde(default)]
    pub keywords: KeywordsSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub sentiment: SentimentSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSection {
    /// Set to false to start without a language model (analysis then returns an error record).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Detected languages for which code-switch segmentation may run.
    #[serde(default = "default_segmentable")]
    pub segmentable: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmenterSection {
    #[serde(default = "default_short_token_max_len")]
    pub short_token_max_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsSection {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Jsonl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default = "StoreSection::default_kind")]
    pub kind: StoreKind,
    /// File path for the `jsonl` store.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Ring size for the `memory` store.
    #[serde(default = "default_store_capacity")]
    pub capacity: usize,
}

impl StoreSection {
    fn default_kind() -> StoreKind {
        StoreKind::Memory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Lexicon,
    Http,
}

/// One sentiment model definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    /// `lexicon`: JSON lexicon path; embedded lexicon when absent.
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
    /// `http`: inference endpoint.
    #[serde(default)]
    pub url: Option<String>,
    /// `http`: env var holding the bearer token.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentSection {
    /// language code -> model
    #[serde(default = "SentimentSection::default_models")]
    pub models: BTreeMap<String, ModelSpec>,
    #[serde(default)]
    pub multilingual: Option<ModelSpec>,
}

impl SentimentSection {
    fn default_models() -> BTreeMap<String, ModelSpec> {
        [LanguageCode::AR, LanguageCode::EN]
            .into_iter()
            .map(|l| {
                let spec = ModelSpec {
                    kind: ModelKind::Lexicon,
                    lexicon: None,
                    url: None,
                    api_key_env: None,
                };
                (l.to_string(), spec)
            })
            .collect()
    }
}

impl Default for LanguageSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_confidence: default_min_confidence(),
            segmentable: default_segmentable(),
        }
    }
}

impl Default for SegmenterSection {
    fn default() -> Self {
        Self {
            short_token_max_len: default_short_token_max_len(),
        }
    }
}

impl Default for KeywordsSection {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            kind: StoreSection::default_kind(),
            path: None,
            capacity: default_store_capacity(),
        }
    }
}

impl Default for SentimentSection {
    fn default() -> Self {
        Self {
            models: SentimentSection::default_models(),
            multilingual: None,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            language: LanguageSection::default(),
            segmenter: SegmenterSection::default(),
            keywords: KeywordsSection::default(),
            store: StoreSection::default(),
            sentiment: SentimentSection::default(),
        }
    }
}

// parse optional usize env
fn parse_top_n_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}

impl AnalyzerConfig {
    /// Resolve the path from env, load, then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let mut cfg = match &explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from_file(path)?
                } else {
                    info!(path = %path.display(), "no analyzer config found, using defaults");
                    Self::default()
                }
            }
        };

        if let Some(n) = parse_top_n_env(std::env::var(ENV_KEYWORDS_TOP_N).ok()) {
            cfg.keywords.top_n = n;
        }
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read analyzer config at {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: AnalyzerConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Structural errors that should abort startup.
    fn validate(&self) -> anyhow::Result<()> {
        let specs = self
            .sentiment
            .models
            .iter()
            .map(|(lang, spec)| (lang.as_str(), spec))
            .chain(self.sentiment.multilingual.iter().map(|s| ("multilingual", s)));
        for (lang, spec) in specs {
            if spec.kind == ModelKind::Http && spec.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                bail!("sentiment model `{lang}`: kind = \"http\" requires `url`");
            }
        }
        if self.store.kind == StoreKind::Jsonl && self.store.path.is_none() {
            bail!("store: kind = \"jsonl\" requires `path`");
        }
        Ok(())
    }

    /// Clamp numeric knobs into sane ranges.
    fn sanitize(&mut self) {
        if !(0.0..=1.0).contains(&self.language.min_confidence) {
            self.language.min_confidence = default_min_confidence();
        }
        self.keywords.top_n = self.keywords.top_n.min(MAX_TOP_N);
        if self.store.capacity == 0 {
            self.store.capacity = default_store_capacity();
        }
    }

    pub fn segmentable_languages(&self) -> Vec<LanguageCode> {
        self.language
            .segmentable
            .iter()
            .map(|s| LanguageCode::new(s))
            .collect()
    }
}
