use crate::client::ClientRecord;
use crate::optimizer::{is_probability, FailurePolicy, SearchError, SearchOutcome, SearchSpace};
use crate::scoring::{Scorer, ScoringError};

/// Exhaustively scores every candidate in `space` applied to `base` and keeps
/// the first one with the highest subscription probability.
///
/// The accumulator starts at (none, 0.0) and is replaced only on a strictly
/// greater score, so a candidate scoring exactly 0 is never selected.
/// A score that is not a finite probability is a `Malformed` scoring failure
/// and follows `policy` like any other.
pub async fn grid_search(
    scorer: &dyn Scorer,
    base: &ClientRecord,
    space: &SearchSpace,
    policy: FailurePolicy,
) -> Result<SearchOutcome, SearchError> {
    space.validate()?;

    let mut outcome = SearchOutcome::empty();
    for candidate in space.candidates() {
        let record = candidate.apply_to(base);
        outcome.evaluated += 1;

        let scored = match scorer.predict_proba(&record).await {
            Ok(probabilities) if is_probability(probabilities.subscribe) => {
                Ok(probabilities.subscribe)
            }
            Ok(probabilities) => Err(ScoringError::Malformed(format!(
                "subscribe probability {} outside [0, 1]",
                probabilities.subscribe
            ))),
            Err(source) => Err(source),
        };
        let score = match scored {
            Ok(score) => score,
            Err(source) => match policy {
                FailurePolicy::Skip => {
                    outcome.failed += 1;
                    continue;
                }
                FailurePolicy::Escalate => {
                    return Err(SearchError::Scoring { candidate, source });
                }
            },
        };

        if score > outcome.score {
            outcome.best = Some(candidate);
            outcome.score = score;
        }
    }
    Ok(outcome)
}
