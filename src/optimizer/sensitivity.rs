use crate::client::ClientRecord;
use crate::optimizer::{is_probability, SensitivityParameter, SensitivityPoint};
use crate::scoring::{Scorer, ScoringError};

const DURATION_POINTS: u32 = 7;
const CAMPAIGN_SWEEP: std::ops::RangeInclusive<u32> = 1..=7;

/// Seven evenly spaced call durations from `duration - 200` (floored at 0) to
/// `duration + 400`, truncated to whole seconds.
pub fn duration_sweep(duration: u32) -> Vec<u32> {
    let start = duration.saturating_sub(200);
    let end = duration.saturating_add(400);
    let span = u64::from(end - start);
    let steps = u64::from(DURATION_POINTS - 1);
    (0..DURATION_POINTS)
        .map(|i| start + (span * u64::from(i) / steps) as u32)
        .collect()
}

/// Scores the record across a duration sweep and then a campaign sweep.
/// Any scoring failure aborts the analysis.
pub async fn sensitivity_analysis(
    scorer: &dyn Scorer,
    base: &ClientRecord,
) -> Result<Vec<SensitivityPoint>, ScoringError> {
    let mut points = Vec::new();

    for value in duration_sweep(base.duration) {
        let mut record = base.clone();
        record.duration = value;
        points.push(score_point(scorer, &record, SensitivityParameter::Duration, value).await?);
    }
    for value in CAMPAIGN_SWEEP {
        let mut record = base.clone();
        record.campaign = value;
        points.push(score_point(scorer, &record, SensitivityParameter::Campaign, value).await?);
    }
    Ok(points)
}

async fn score_point(
    scorer: &dyn Scorer,
    record: &ClientRecord,
    parameter: SensitivityParameter,
    value: u32,
) -> Result<SensitivityPoint, ScoringError> {
    let probability = scorer.predict_proba(record).await?.subscribe;
    if !is_probability(probability) {
        return Err(ScoringError::Malformed(format!(
            "{parameter} = {value} scored {probability}"
        )));
    }
    Ok(SensitivityPoint {
        parameter,
        value,
        probability,
    })
}
