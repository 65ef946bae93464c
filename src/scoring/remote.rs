use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::client::ClientRecord;
use crate::scoring::{ClassProbabilities, Scorer, ScoringError, ScoringPayload};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Scores records against a model server that speaks
/// `{"instances": [...]}` -> `{"probabilities": [[p0, p1], ...]}`.
pub struct HttpScorer {
    client: Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<ScoringPayload<'a>>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probabilities: Vec<[f64; 2]>,
}

impl HttpScorer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("banksync/0.1")
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .context("failed to build model HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, records: &[ClientRecord]) -> Result<Vec<ClassProbabilities>, ScoringError> {
        let request = PredictRequest {
            instances: records.iter().map(ScoringPayload::new).collect(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoringError::Unavailable(format!("POST {}: {e}", self.url)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ScoringError::Unavailable(format!("reading {}: {e}", self.url)))?;
        if status.is_client_error() {
            let preview: String = body.chars().take(180).collect();
            return Err(ScoringError::InvalidInput(format!(
                "POST {} returned {status}: {preview}",
                self.url
            )));
        }
        if !status.is_success() {
            let preview: String = body.chars().take(180).collect();
            return Err(ScoringError::Unavailable(format!(
                "POST {} returned {status}: {preview}",
                self.url
            )));
        }
        parse_predict_response(&body, records.len())
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    fn name(&self) -> &str {
        &self.url
    }

    async fn predict_proba(
        &self,
        record: &ClientRecord,
    ) -> Result<ClassProbabilities, ScoringError> {
        let mut out = self.post(std::slice::from_ref(record)).await?;
        out.pop()
            .ok_or_else(|| ScoringError::Malformed("empty probability list".to_string()))
    }

    async fn predict_batch(
        &self,
        records: &[ClientRecord],
    ) -> Result<Vec<ClassProbabilities>, ScoringError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.post(records).await
    }
}

pub fn parse_predict_response(
    body: &str,
    expected: usize,
) -> Result<Vec<ClassProbabilities>, ScoringError> {
    let parsed: PredictResponse = serde_json::from_str(body)
        .map_err(|e| ScoringError::Malformed(format!("invalid prediction JSON: {e}")))?;
    if parsed.probabilities.len() != expected {
        return Err(ScoringError::Malformed(format!(
            "expected {expected} probability pairs, got {}",
            parsed.probabilities.len()
        )));
    }
    parsed
        .probabilities
        .into_iter()
        .map(|[decline, subscribe]| ClassProbabilities::checked(decline, subscribe))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_predict_response;
    use crate::scoring::ScoringError;

    #[test]
    fn parses_probability_pairs() {
        let parsed = parse_predict_response(r#"{"probabilities": [[0.75, 0.25], [0.1, 0.9]]}"#, 2)
            .expect("valid payload");
        assert_eq!(parsed.len(), 2);
        assert!((parsed[1].subscribe - 0.9).abs() < 1e-12);
    }

    #[test]
    fn rejects_count_mismatch_and_bad_values() {
        let short = parse_predict_response(r#"{"probabilities": [[0.5, 0.5]]}"#, 2);
        assert!(matches!(short, Err(ScoringError::Malformed(_))));

        let out_of_range = parse_predict_response(r#"{"probabilities": [[-0.5, 1.5]]}"#, 1);
        assert!(matches!(out_of_range, Err(ScoringError::Malformed(_))));

        let garbage = parse_predict_response("<html>", 1);
        assert!(matches!(garbage, Err(ScoringError::Malformed(_))));
    }
}
