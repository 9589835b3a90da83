// src/keywords.rs
//! Keyword extraction collaborator and the built-in frequency extractor.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::lang::LanguageCode;
use crate::normalize::is_stopword;

/// Only unigrams are requested from extractors.
pub const MAX_NGRAM_LENGTH: usize = 1;

pub const DEFAULT_TOP_N: usize = 5;

/// Top-N salient unigrams, most salient first.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        language: &LanguageCode,
        top_n: usize,
    ) -> anyhow::Result<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Term frequency over stopword-filtered unigrams; ties go to the term seen first.
#[derive(Debug, Clone, Default)]
pub struct FrequencyKeywordExtractor;

impl FrequencyKeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    fn is_candidate(language: &LanguageCode, token: &str) -> bool {
        token.chars().count() >= 2
            && !token.chars().all(|c| c.is_numeric())
            && !is_stopword(language, token)
    }

    pub fn rank(&self, text: &str, language: &LanguageCode, top_n: usize) -> Vec<String> {
        // term -> (frequency, first position)
        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
        for (pos, tok) in text.split_whitespace().enumerate() {
            if !Self::is_candidate(language, tok) {
                continue;
            }
            stats.entry(tok).or_insert((0, pos)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> =
            stats.into_iter().map(|(t, (f, p))| (t, f, p)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .take(top_n)
            .map(|(t, _, _)| t.to_string())
            .collect()
    }
}

#[async_trait]
impl KeywordExtractor for FrequencyKeywordExtractor {
    async fn extract(
        &self,
        text: &str,
        language: &LanguageCode,
        top_n: usize,
    ) -> anyhow::Result<Vec<String>> {
        Ok(self.rank(text, language, top_n))
    }

    fn name(&self) -> &'static str {
        "frequency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_frequency_then_position() {
        let x = FrequencyKeywordExtractor::new();
        let kw = x.rank(
            "the delivery was late and the delivery guy was rude rude rude",
            &LanguageCode::en(),
            3,
        );
        assert_eq!(kw, vec!["rude", "delivery", "late"]);
    }

    #[test]
    fn drops_stopwords_short_tokens_and_numbers() {
        let x = FrequencyKeywordExtractor::new();
        let kw = x.rank("a 42 is of x service", &LanguageCode::en(), 10);
        assert_eq!(kw, vec!["service"]);
    }

    #[test]
    fn arabic_stopwords() {
        let x = FrequencyKeywordExtractor::new();
        let kw = x.rank("الخدمة في المطعم كانت ممتازة", &LanguageCode::ar(), 5);
        assert_eq!(kw, vec!["الخدمة", "المطعم", "ممتازة"]);
    }

    #[tokio::test]
    async fn respects_top_n_and_empty_text() {
        let x = FrequencyKeywordExtractor::new();
        let kw = x.extract("alpha beta gamma delta", &LanguageCode::en(), 2).await.unwrap();
        assert_eq!(kw.len(), 2);
        assert!(x.extract("", &LanguageCode::en(), 5).await.unwrap().is_empty());
        assert!(x.extract("alpha", &LanguageCode::en(), 0).await.unwrap().is_empty());
    }
}
