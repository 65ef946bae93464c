#[cfg(test)]
pub(crate) mod fixtures;
pub mod logistic;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientRecord;
use crate::config::ModelConfig;
use crate::scoring::logistic::LogisticModel;
use crate::scoring::remote::HttpScorer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub decline: f64,
    pub subscribe: f64,
}

impl ClassProbabilities {
    pub fn checked(decline: f64, subscribe: f64) -> Result<Self, ScoringError> {
        for (label, value) in [("decline", decline), ("subscribe", subscribe)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::Malformed(format!(
                    "{label} probability {value} is outside [0, 1]"
                )));
            }
        }
        Ok(Self { decline, subscribe })
    }

    pub fn from_subscribe(subscribe: f64) -> Result<Self, ScoringError> {
        Self::checked(1.0 - subscribe, subscribe)
    }

    pub fn predicts_subscription(&self) -> bool {
        self.subscribe >= 0.5
    }

    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.subscribe.max(self.decline)
    }
}

/// Classification view of one scored record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub will_subscribe: bool,
    pub confidence: f64,
    pub subscribe: f64,
    pub decline: f64,
}

impl From<ClassProbabilities> for Prediction {
    fn from(p: ClassProbabilities) -> Self {
        Self {
            will_subscribe: p.predicts_subscription(),
            confidence: p.confidence(),
            subscribe: p.subscribe,
            decline: p.decline,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("invalid model input: {0}")]
    InvalidInput(String),
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("malformed model output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    async fn predict_proba(&self, record: &ClientRecord)
        -> Result<ClassProbabilities, ScoringError>;

    async fn predict_batch(
        &self,
        records: &[ClientRecord],
    ) -> Result<Vec<ClassProbabilities>, ScoringError> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.predict_proba(record).await?);
        }
        Ok(out)
    }
}

/// Wire shape of one model input row: the record plus the derived contact flag.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringPayload<'a> {
    #[serde(flatten)]
    pub record: &'a ClientRecord,
    pub was_contacted_before: &'static str,
}

impl<'a> ScoringPayload<'a> {
    pub fn new(record: &'a ClientRecord) -> Self {
        Self {
            record,
            was_contacted_before: contacted_label(record),
        }
    }
}

pub fn contacted_label(record: &ClientRecord) -> &'static str {
    if record.was_contacted_before() {
        "yes"
    } else {
        "no"
    }
}

pub fn build_scorer(config: &ModelConfig) -> Result<Arc<dyn Scorer>> {
    if !config.url.trim().is_empty() {
        let scorer = HttpScorer::new(
            config.url.trim(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )?;
        return Ok(Arc::new(scorer));
    }
    if !config.path.trim().is_empty() {
        let model = LogisticModel::load(&config.resolved_path())?;
        return Ok(Arc::new(model));
    }
    Ok(Arc::new(LogisticModel::builtin()))
}
