use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{ClientRecord, REQUIRED_COLUMNS};
use crate::optimizer::is_probability;
use crate::scoring::{Scorer, ScoringError};

pub const DEFAULT_THRESHOLD: f64 = 0.5;
pub const PROBABILITY_COLUMN: &str = "subscription_probability";
pub const RECOMMENDATION_COLUMN: &str = "recommendation";

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("could not parse upload: {0}")]
    Parse(String),
    #[error("upload is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Prioritize,
    #[serde(rename = "De-prioritize")]
    Deprioritize,
}

impl Recommendation {
    pub fn for_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Self::Prioritize
        } else {
            Self::Deprioritize
        }
    }
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prioritize => write!(f, "Prioritize"),
            Self::Deprioritize => write!(f, "De-prioritize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    /// Original cell values, in upload column order.
    pub values: Vec<String>,
    pub probability: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkReport {
    pub headers: Vec<String>,
    pub rows: Vec<ScoredRow>,
    pub threshold: f64,
}

impl BulkReport {
    pub fn prioritized(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.recommendation == Recommendation::Prioritize)
            .count()
    }
}

/// Required columns absent from `headers`, in required-column order.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == **required))
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUpload {
    pub headers: Vec<String>,
    /// Raw cells alongside the typed record, one entry per data row.
    pub rows: Vec<(Vec<String>, ClientRecord)>,
}

/// Parses a CSV upload into client records, keeping the raw cells of each row.
pub fn parse_upload(input: &str) -> Result<ParsedUpload, BulkError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| BulkError::Parse(e.to_string()))?
        .clone();
    let header_names = headers.iter().map(str::to_string).collect::<Vec<_>>();

    let missing = missing_columns(&header_names);
    if !missing.is_empty() {
        return Err(BulkError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| BulkError::Parse(format!("row {}: {e}", index + 1)))?;
        let record: ClientRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| BulkError::Parse(format!("row {}: {e}", index + 1)))?;
        rows.push((row.iter().map(str::to_string).collect(), record));
    }
    Ok(ParsedUpload {
        headers: header_names,
        rows,
    })
}

/// Scores every row of a CSV upload. Any failure rejects the whole upload.
pub async fn score_upload(
    scorer: &dyn Scorer,
    input: &str,
    threshold: f64,
) -> Result<BulkReport, BulkError> {
    let ParsedUpload { headers, rows } = parse_upload(input)?;
    let (values, records): (Vec<_>, Vec<_>) = rows.into_iter().unzip();

    let probabilities = scorer.predict_batch(&records).await?;
    if probabilities.len() != records.len() {
        return Err(ScoringError::Malformed(format!(
            "expected {} predictions, got {}",
            records.len(),
            probabilities.len()
        ))
        .into());
    }

    let mut rows = Vec::with_capacity(values.len());
    for (values, p) in values.into_iter().zip(probabilities) {
        if !is_probability(p.subscribe) {
            return Err(ScoringError::Malformed(format!(
                "subscribe probability {} is outside [0, 1]",
                p.subscribe
            ))
            .into());
        }
        rows.push(ScoredRow {
            values,
            probability: p.subscribe,
            recommendation: Recommendation::for_probability(p.subscribe, threshold),
        });
    }

    Ok(BulkReport {
        headers,
        rows,
        threshold,
    })
}
