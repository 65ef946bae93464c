use serde::Serialize;

use crate::client::ClientRecord;
use crate::optimizer::gridsearch::grid_search;
use crate::optimizer::{
    Candidate, FailurePolicy, ParameterChange, SearchError, SearchOutcome, SearchSpace,
    TunableField,
};
use crate::scoring::Scorer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    /// Probability of the record as submitted; `None` if it could not be scored.
    pub base_probability: Option<f64>,
    pub outcome: SearchOutcome,
    pub changes: Vec<ParameterChange>,
    pub actions: Vec<String>,
}

/// Grid search plus the field-level changes needed to reach the best candidate.
pub async fn recommend(
    scorer: &dyn Scorer,
    base: &ClientRecord,
    space: &SearchSpace,
    policy: FailurePolicy,
) -> Result<RecommendationReport, SearchError> {
    let base_probability = scorer.predict_proba(base).await.ok().map(|p| p.subscribe);
    let outcome = grid_search(scorer, base, space, policy).await?;
    let changes = outcome
        .best
        .map(|best| describe_changes(base, &best))
        .unwrap_or_default();
    let actions = match outcome.best {
        Some(_) => action_lines(&changes),
        None => vec!["No candidate scored above zero".to_string()],
    };
    Ok(RecommendationReport {
        base_probability,
        outcome,
        changes,
        actions,
    })
}

/// Lists the fields where `candidate` differs from `base`, in tunable-field order.
pub fn describe_changes(base: &ClientRecord, candidate: &Candidate) -> Vec<ParameterChange> {
    let pairs = [
        (
            TunableField::Contact,
            base.contact.to_string(),
            candidate.contact.to_string(),
        ),
        (
            TunableField::Month,
            base.month.to_string(),
            candidate.month.to_string(),
        ),
        (
            TunableField::Duration,
            base.duration.to_string(),
            candidate.duration.to_string(),
        ),
        (
            TunableField::Campaign,
            base.campaign.to_string(),
            candidate.campaign.to_string(),
        ),
        (
            TunableField::Poutcome,
            base.poutcome.to_string(),
            candidate.poutcome.to_string(),
        ),
    ];

    pairs
        .into_iter()
        .filter(|(_, from, to)| from != to)
        .map(|(field, from, to)| ParameterChange { field, from, to })
        .collect()
}

/// Human-readable action lines, e.g. "Change month from may to mar".
pub fn action_lines(changes: &[ParameterChange]) -> Vec<String> {
    if changes.is_empty() {
        return vec!["Keep the current campaign settings".to_string()];
    }
    changes
        .iter()
        .map(|c| format!("Change {} from {} to {}", c.field, c.from, c.to))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Contact, Month, PreviousOutcome};

    #[test]
    fn lists_only_differing_fields() {
        let base = ClientRecord::sample();
        let candidate = Candidate {
            contact: base.contact,
            month: Month::Mar,
            duration: base.duration,
            campaign: 1,
            poutcome: PreviousOutcome::Success,
        };
        let changes = describe_changes(&base, &candidate);
        let fields = changes.iter().map(|c| c.field).collect::<Vec<_>>();
        assert_eq!(
            fields,
            vec![
                TunableField::Month,
                TunableField::Campaign,
                TunableField::Poutcome
            ]
        );
        assert_eq!(
            action_lines(&changes)[0],
            "Change month from may to mar".to_string()
        );
    }

    #[test]
    fn report_describes_the_winning_changes() {
        use crate::scoring::fixtures::FnScorer;

        let scorer = FnScorer::new(|record: &ClientRecord| {
            Ok(if record.month == Month::Mar { 0.8 } else { 0.1 })
        });
        let report = tokio_test::block_on(recommend(
            &scorer,
            &ClientRecord::sample(),
            &SearchSpace::default(),
            FailurePolicy::Skip,
        ))
        .expect("search runs");
        assert_eq!(report.base_probability, Some(0.1));
        assert_eq!(report.outcome.score, 0.8);
        assert!(report
            .changes
            .iter()
            .any(|c| c.field == TunableField::Month && c.to == "mar"));
    }

    #[test]
    fn identical_candidate_keeps_settings() {
        let base = ClientRecord::sample();
        let candidate = Candidate {
            contact: Contact::Cellular,
            month: base.month,
            duration: base.duration,
            campaign: base.campaign,
            poutcome: base.poutcome,
        };
        let changes = describe_changes(&base, &candidate);
        assert!(changes.is_empty());
        assert_eq!(action_lines(&changes).len(), 1);
    }
}
