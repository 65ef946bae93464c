use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::client::ClientRecord;

pub const BALANCE_RANGE: RangeInclusive<i64> = -10_000..=100_000;
pub const PDAYS_RANGE: RangeInclusive<i32> = -1..=999;
pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;
pub const DAY_RANGE: RangeInclusive<u32> = 1..=31;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_record(record: &ClientRecord) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if !BALANCE_RANGE.contains(&record.balance) {
        issues.push(issue(
            "balance",
            format!(
                "must be between {} and {}",
                BALANCE_RANGE.start(),
                BALANCE_RANGE.end()
            ),
        ));
    }
    if !PDAYS_RANGE.contains(&record.pdays) {
        issues.push(issue(
            "pdays",
            format!(
                "days since previous contact must be between {} and {}",
                PDAYS_RANGE.start(),
                PDAYS_RANGE.end()
            ),
        ));
    }
    if !AGE_RANGE.contains(&record.age) {
        issues.push(issue(
            "age",
            format!(
                "must be between {} and {}",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            ),
        ));
    }
    if !DAY_RANGE.contains(&record.day) {
        issues.push(issue("day", "must be a day of the month (1-31)"));
    }
    if record.campaign == 0 {
        issues.push(issue("campaign", "at least one contact is required"));
    }
    issues
}

fn issue(field: &'static str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_record_is_valid() {
        assert!(validate_record(&ClientRecord::sample()).is_empty());
    }

    #[test]
    fn reports_every_issue() {
        let mut record = ClientRecord::sample();
        record.balance = 250_000;
        record.pdays = -5;
        record.campaign = 0;
        let fields = validate_record(&record)
            .into_iter()
            .map(|i| i.field)
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["balance", "pdays", "campaign"]);
    }

    #[test]
    fn range_edges_are_inclusive() {
        let mut record = ClientRecord::sample();
        record.balance = -10_000;
        record.pdays = 999;
        record.age = 18;
        assert!(validate_record(&record).is_empty());
    }
}
