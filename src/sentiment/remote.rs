// src/sentiment/remote.rs
//! Remote sentiment model served over HTTP (Hugging Face inference style).
//!
//! Request:  `POST <url>` with `{"inputs": "<text>"}` and an optional bearer token.
//! Response: `[{"label": .., "score": ..}, ..]` or `[[{"label": .., "score": ..}, ..]]`.
//! The highest-scoring label wins.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RawSentiment, SentimentClassifier};

pub struct HttpSentimentClassifier {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    name: String,
}

impl HttpSentimentClassifier {
    /// `api_key_env`: name of the env var holding the bearer token, if any.
    pub fn new(name: impl Into<String>, url: impl Into<String>, api_key_env: Option<&str>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("feedback-sentiment-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("build reqwest client")?;
        let api_key = api_key_env
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            http,
            url: url.into(),
            api_key,
            name: name.into(),
        })
    }
}

#[derive(Serialize)]
struct Req<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct Scored {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Resp {
    Nested(Vec<Vec<Scored>>),
    Flat(Vec<Scored>),
}

/// Pick the best label out of either response shape.
fn best_of(resp: Resp) -> Option<RawSentiment> {
    let all: Vec<Scored> = match resp {
        Resp::Nested(v) => v.into_iter().flatten().collect(),
        Resp::Flat(v) => v,
    };
    all.into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|s| RawSentiment {
            label: s.label,
            score: s.score,
        })
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> anyhow::Result<RawSentiment> {
        let mut req = self.http.post(&self.url).json(&Req { inputs: text });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.context("sentiment endpoint request")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("sentiment endpoint returned HTTP {status}");
        }
        let body: Resp = resp.json().await.context("decode sentiment response")?;
        best_of(body).ok_or_else(|| anyhow!("sentiment endpoint returned no labels"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
