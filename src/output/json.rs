use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::bulk::{BulkReport, PROBABILITY_COLUMN, RECOMMENDATION_COLUMN};

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One object per uploaded row, keyed by the original headers plus the scoring columns.
pub fn bulk_rows_json(report: &BulkReport) -> Result<String> {
    let rows = report
        .rows
        .iter()
        .map(|row| {
            let mut obj = report
                .headers
                .iter()
                .cloned()
                .zip(row.values.iter().cloned().map(Value::String))
                .collect::<Map<_, _>>();
            obj.insert(PROBABILITY_COLUMN.to_string(), Value::from(row.probability));
            obj.insert(
                RECOMMENDATION_COLUMN.to_string(),
                Value::String(row.recommendation.to_string()),
            );
            Value::Object(obj)
        })
        .collect::<Vec<_>>();
    render_json(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::{Recommendation, ScoredRow};

    #[test]
    fn bulk_rows_keep_headers_as_keys() {
        let report = BulkReport {
            headers: vec!["id".to_string(), "age".to_string()],
            rows: vec![ScoredRow {
                values: vec!["c-1".to_string(), "41".to_string()],
                probability: 0.75,
                recommendation: Recommendation::Prioritize,
            }],
            threshold: 0.5,
        };
        let value: Value = serde_json::from_str(&bulk_rows_json(&report).expect("render"))
            .expect("valid json");
        assert_eq!(value[0]["id"], "c-1");
        assert_eq!(value[0]["subscription_probability"], 0.75);
        assert_eq!(value[0]["recommendation"], "Prioritize");
    }
}
