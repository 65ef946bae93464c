use crate::client::{ClientRecord, Month};
use crate::optimizer::{is_probability, MinimalChange, ParameterChange, TunableField};
use crate::scoring::{Scorer, ScoringError};

const DURATION_STEPS: [u32; 4] = [100, 300, 600, 1000];
const CAMPAIGN_STEPS: [u32; 3] = [1, 2, 3];
const MONTH_STEPS: [Month; 4] = [Month::Mar, Month::Sep, Month::Oct, Month::Dec];

/// Single-field tweaks in the order they are tried.
fn tweaks(base: &ClientRecord) -> Vec<(ParameterChange, ClientRecord)> {
    let mut out = Vec::new();

    for duration in DURATION_STEPS.into_iter().filter(|d| *d > base.duration) {
        let mut record = base.clone();
        record.duration = duration;
        out.push((
            change(TunableField::Duration, base.duration, duration),
            record,
        ));
    }
    for campaign in CAMPAIGN_STEPS.into_iter().filter(|c| *c < base.campaign) {
        let mut record = base.clone();
        record.campaign = campaign;
        out.push((
            change(TunableField::Campaign, base.campaign, campaign),
            record,
        ));
    }
    for month in MONTH_STEPS {
        let mut record = base.clone();
        record.month = month;
        out.push((change(TunableField::Month, base.month, month), record));
    }
    out
}

fn change(field: TunableField, from: impl ToString, to: impl ToString) -> ParameterChange {
    ParameterChange {
        field,
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Returns the first single-parameter change that lifts the subscription
/// probability to `threshold` or above.
///
/// A failure scoring the unchanged record is returned as an error; failures on
/// individual tweaks are skipped and counted.
pub async fn find_minimal_change(
    scorer: &dyn Scorer,
    base: &ClientRecord,
    threshold: f64,
) -> Result<MinimalChange, ScoringError> {
    let original = scorer.predict_proba(base).await?.subscribe;
    if !is_probability(original) {
        return Err(ScoringError::Malformed(format!(
            "subscribe probability {original} is outside [0, 1]"
        )));
    }

    let mut failed = 0;
    for (change, record) in tweaks(base) {
        match scorer.predict_proba(&record).await {
            Ok(p) if is_probability(p.subscribe) => {
                if p.subscribe >= threshold {
                    return Ok(MinimalChange {
                        change: Some(change),
                        probability: p.subscribe,
                        original_probability: original,
                        failed,
                    });
                }
            }
            _ => failed += 1,
        }
    }

    Ok(MinimalChange {
        change: None,
        probability: original,
        original_probability: original,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fixtures::{failing, FnScorer};

    fn base() -> ClientRecord {
        let mut record = ClientRecord::sample();
        record.duration = 260;
        record.campaign = 3;
        record.month = Month::May;
        record
    }

    #[test]
    fn tweak_order_respects_direction_filters() {
        let order = tweaks(&base())
            .into_iter()
            .map(|(c, _)| format!("{}={}", c.field, c.to))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                "duration=300",
                "duration=600",
                "duration=1000",
                "campaign=1",
                "campaign=2",
                "month=mar",
                "month=sep",
                "month=oct",
                "month=dec",
            ]
        );
    }

    #[test]
    fn returns_first_change_that_crosses_threshold() {
        let scorer = FnScorer::new(|record: &ClientRecord| {
            Ok(if record.duration >= 600 { 0.55 } else { 0.2 })
        });
        let result = tokio_test::block_on(find_minimal_change(&scorer, &base(), 0.5))
            .expect("base scores");
        let change = result.change.expect("a change works");
        assert_eq!(change.field, TunableField::Duration);
        assert_eq!(change.from, "260");
        assert_eq!(change.to, "600");
        assert_eq!(result.probability, 0.55);
        assert_eq!(result.original_probability, 0.2);
    }

    #[test]
    fn falls_back_to_month_when_numeric_tweaks_fail() {
        let scorer = FnScorer::new(|record: &ClientRecord| {
            if record.duration != 260 {
                return Err(ScoringError::Unavailable("flaky".to_string()));
            }
            Ok(if record.month == Month::Oct { 0.6 } else { 0.1 })
        });
        let result = tokio_test::block_on(find_minimal_change(&scorer, &base(), 0.5))
            .expect("base scores");
        assert_eq!(
            result.change.map(|c| c.to),
            Some("oct".to_string())
        );
        assert_eq!(result.failed, 3);
    }

    #[test]
    fn no_change_reports_original_probability() {
        let scorer = FnScorer::new(|_: &ClientRecord| Ok(0.3));
        let result = tokio_test::block_on(find_minimal_change(&scorer, &base(), 0.5))
            .expect("base scores");
        assert!(result.change.is_none());
        assert_eq!(result.probability, 0.3);
    }

    #[test]
    fn base_failure_is_an_error() {
        let result = tokio_test::block_on(find_minimal_change(&failing(), &base(), 0.5));
        assert!(result.is_err());
    }
}
