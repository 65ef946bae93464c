use async_trait::async_trait;

use crate::client::ClientRecord;
use crate::scoring::{ClassProbabilities, Scorer, ScoringError};

/// Scorer driven by a closure returning the raw subscribe probability.
pub struct FnScorer<F> {
    score: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&ClientRecord) -> Result<f64, ScoringError> + Send + Sync,
{
    pub fn new(score: F) -> Self {
        Self { score }
    }
}

#[async_trait]
impl<F> Scorer for FnScorer<F>
where
    F: Fn(&ClientRecord) -> Result<f64, ScoringError> + Send + Sync,
{
    fn name(&self) -> &str {
        "fixture"
    }

    async fn predict_proba(
        &self,
        record: &ClientRecord,
    ) -> Result<ClassProbabilities, ScoringError> {
        let subscribe = (self.score)(record)?;
        // Out-of-range values pass through so callers can exercise their own checks.
        Ok(ClassProbabilities {
            decline: 1.0 - subscribe,
            subscribe,
        })
    }
}

pub fn failing() -> FnScorer<impl Fn(&ClientRecord) -> Result<f64, ScoringError> + Send + Sync> {
    FnScorer::new(|_: &ClientRecord| Err(ScoringError::Unavailable("offline".to_string())))
}
