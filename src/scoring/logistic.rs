use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::ClientRecord;
use crate::scoring::{contacted_label, ClassProbabilities, Scorer, ScoringError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericCoefficient {
    pub mean: f64,
    pub scale: f64,
    pub weight: f64,
}

/// Logistic regression exported from a standard-scaler + one-hot pipeline.
///
/// Categories absent from `categorical` contribute nothing, matching an
/// encoder fitted with unknown categories ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, NumericCoefficient>,
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading model file: {}", path.display()))?;
        let model: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing model JSON: {}", path.display()))?;
        Ok(model)
    }

    pub fn builtin() -> Self {
        let numeric = [
            ("age", 40.9, 10.6, 0.02),
            ("balance", 1_362.0, 3_044.0, 0.08),
            ("day", 15.8, 8.3, -0.05),
            ("duration", 258.0, 257.5, 1.05),
            ("campaign", 2.76, 3.1, -0.35),
            ("pdays", 40.2, 100.1, 0.10),
            ("previous", 0.58, 2.3, 0.05),
        ]
        .into_iter()
        .map(|(name, mean, scale, weight)| {
            (
                name.to_string(),
                NumericCoefficient {
                    mean,
                    scale,
                    weight,
                },
            )
        })
        .collect();

        let categorical = [
            (
                "job",
                vec![
                    ("retired", 0.40),
                    ("student", 0.50),
                    ("management", 0.10),
                    ("blue-collar", -0.30),
                    ("entrepreneur", -0.20),
                    ("housemaid", -0.20),
                    ("services", -0.20),
                ],
            ),
            ("marital", vec![("married", -0.20), ("single", 0.10)]),
            ("education", vec![("tertiary", 0.20), ("primary", -0.10)]),
            ("default", vec![("yes", -0.20)]),
            ("housing", vec![("yes", -0.60)]),
            ("loan", vec![("yes", -0.40)]),
            ("contact", vec![("cellular", 0.10), ("unknown", -1.20)]),
            (
                "month",
                vec![
                    ("jan", -0.90),
                    ("feb", -0.10),
                    ("mar", 1.50),
                    ("apr", 0.10),
                    ("may", -0.40),
                    ("jul", -0.50),
                    ("aug", -0.50),
                    ("sep", 0.90),
                    ("oct", 1.00),
                    ("nov", -0.60),
                    ("dec", 0.80),
                ],
            ),
            (
                "poutcome",
                vec![("success", 2.20), ("failure", -0.10), ("other", 0.10)],
            ),
            ("was_contacted_before", vec![("yes", 0.30)]),
        ]
        .into_iter()
        .map(|(feature, levels)| {
            (
                feature.to_string(),
                levels
                    .into_iter()
                    .map(|(level, weight)| (level.to_string(), weight))
                    .collect(),
            )
        })
        .collect();

        Self {
            name: "builtin-logistic".to_string(),
            intercept: -2.4,
            numeric,
            categorical,
        }
    }

    pub fn logit(&self, record: &ClientRecord) -> Result<f64, ScoringError> {
        let mut z = self.intercept;
        for (feature, value) in numeric_features(record) {
            let Some(coef) = self.numeric.get(feature) else {
                continue;
            };
            if !coef.scale.is_finite() || coef.scale <= 0.0 {
                return Err(ScoringError::Malformed(format!(
                    "numeric feature {feature} has non-positive scale {}",
                    coef.scale
                )));
            }
            z += coef.weight * (value - coef.mean) / coef.scale;
        }
        for (feature, level) in categorical_features(record) {
            if let Some(weight) = self
                .categorical
                .get(feature)
                .and_then(|levels| levels.get(level))
            {
                z += weight;
            }
        }
        if !z.is_finite() {
            return Err(ScoringError::Malformed(format!(
                "{} produced a non-finite logit",
                self.name
            )));
        }
        Ok(z)
    }
}

#[async_trait]
impl Scorer for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict_proba(
        &self,
        record: &ClientRecord,
    ) -> Result<ClassProbabilities, ScoringError> {
        let z = self.logit(record)?;
        ClassProbabilities::from_subscribe(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn numeric_features(record: &ClientRecord) -> [(&'static str, f64); 7] {
    [
        ("age", f64::from(record.age)),
        ("balance", record.balance as f64),
        ("day", f64::from(record.day)),
        ("duration", f64::from(record.duration)),
        ("campaign", f64::from(record.campaign)),
        ("pdays", f64::from(record.pdays)),
        ("previous", f64::from(record.previous)),
    ]
}

fn categorical_features(record: &ClientRecord) -> [(&'static str, &'static str); 10] {
    [
        ("job", record.job.as_slug()),
        ("marital", record.marital.as_slug()),
        ("education", record.education.as_slug()),
        ("default", record.credit_default.as_slug()),
        ("housing", record.housing.as_slug()),
        ("loan", record.loan.as_slug()),
        ("contact", record.contact.as_slug()),
        ("month", record.month.as_slug()),
        ("poutcome", record.poutcome.as_slug()),
        ("was_contacted_before", contacted_label(record)),
    ]
}

fn default_model_name() -> String {
    "logistic".to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::client::{Month, PreviousOutcome};

    fn subscribe(model: &LogisticModel, record: &ClientRecord) -> f64 {
        tokio_test::block_on(model.predict_proba(record))
            .expect("builtin model scores sample")
            .subscribe
    }

    #[test]
    fn builtin_probabilities_are_in_unit_interval() {
        let model = LogisticModel::builtin();
        let p = subscribe(&model, &ClientRecord::sample());
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn longer_calls_and_prior_success_raise_probability() {
        let model = LogisticModel::builtin();
        let base = ClientRecord::sample();
        let mut longer = base.clone();
        longer.duration = 1_000;
        assert!(subscribe(&model, &longer) > subscribe(&model, &base));

        let mut success = base.clone();
        success.poutcome = PreviousOutcome::Success;
        let mut failure = base.clone();
        failure.poutcome = PreviousOutcome::Failure;
        assert!(subscribe(&model, &success) > subscribe(&model, &failure));

        let mut march = base.clone();
        march.month = Month::Mar;
        assert!(subscribe(&model, &march) > subscribe(&model, &base));
    }

    #[test]
    fn zero_scale_is_a_scoring_error() {
        let mut model = LogisticModel::builtin();
        model
            .numeric
            .get_mut("duration")
            .expect("duration coefficient")
            .scale = 0.0;
        let err = tokio_test::block_on(model.predict_proba(&ClientRecord::sample()))
            .expect_err("zero scale must fail");
        assert!(matches!(err, ScoringError::Malformed(_)));
    }

    #[test]
    fn loads_exported_model_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(
            br#"{
                "name": "exported",
                "intercept": 0.0,
                "categorical": { "month": { "mar": 2.0 } }
            }"#,
        )
        .expect("write model");
        file.flush().expect("flush");

        let model = LogisticModel::load(file.path()).expect("load model");
        assert_eq!(model.name(), "exported");
        assert!(model.numeric.is_empty());

        let mut record = ClientRecord::sample();
        assert!((subscribe(&model, &record) - 0.5).abs() < 1e-12);
        record.month = Month::Mar;
        assert!((subscribe(&model, &record) - sigmoid(2.0)).abs() < 1e-12);
    }
}
