pub mod gridsearch;
pub mod minimal;
pub mod recommendations;
pub mod sensitivity;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{ClientRecord, Contact, Month, PreviousOutcome};
use crate::scoring::ScoringError;

/// The campaign-side fields a recommendation is allowed to change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TunableField {
    Contact,
    Month,
    Duration,
    Campaign,
    Poutcome,
}

impl Display for TunableField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Contact => "contact",
            Self::Month => "month",
            Self::Duration => "duration",
            Self::Campaign => "campaign",
            Self::Poutcome => "poutcome",
        };
        f.write_str(label)
    }
}

/// Option lists for every tunable field. Candidates are enumerated
/// lexicographically in declaration order: contact is the outermost loop and
/// poutcome the innermost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub contact: Vec<Contact>,
    pub month: Vec<Month>,
    pub duration: Vec<u32>,
    pub campaign: Vec<u32>,
    pub poutcome: Vec<PreviousOutcome>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            contact: vec![Contact::Cellular, Contact::Telephone, Contact::Unknown],
            month: Month::ALL.to_vec(),
            duration: vec![100, 300, 500, 1000, 1500],
            campaign: vec![1, 2, 3, 5, 7],
            poutcome: vec![
                PreviousOutcome::Success,
                PreviousOutcome::Failure,
                PreviousOutcome::Other,
                PreviousOutcome::Unknown,
            ],
        }
    }
}

impl SearchSpace {
    pub fn size(&self) -> usize {
        self.contact.len()
            * self.month.len()
            * self.duration.len()
            * self.campaign.len()
            * self.poutcome.len()
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        let lengths = [
            (TunableField::Contact, self.contact.len()),
            (TunableField::Month, self.month.len()),
            (TunableField::Duration, self.duration.len()),
            (TunableField::Campaign, self.campaign.len()),
            (TunableField::Poutcome, self.poutcome.len()),
        ];
        match lengths.into_iter().find(|(_, len)| *len == 0) {
            Some((field, _)) => Err(SearchError::EmptyOptions(field)),
            None => Ok(()),
        }
    }

    pub fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.contact.iter().flat_map(move |&contact| {
            self.month.iter().flat_map(move |&month| {
                self.duration.iter().flat_map(move |&duration| {
                    self.campaign.iter().flat_map(move |&campaign| {
                        self.poutcome.iter().map(move |&poutcome| Candidate {
                            contact,
                            month,
                            duration,
                            campaign,
                            poutcome,
                        })
                    })
                })
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub contact: Contact,
    pub month: Month,
    pub duration: u32,
    pub campaign: u32,
    pub poutcome: PreviousOutcome,
}

impl Candidate {
    pub fn apply_to(&self, base: &ClientRecord) -> ClientRecord {
        let mut record = base.clone();
        record.contact = self.contact;
        record.month = self.month;
        record.duration = self.duration;
        record.campaign = self.campaign;
        record.poutcome = self.poutcome;
        record
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "contact={} month={} duration={} campaign={} poutcome={}",
            self.contact, self.month, self.duration, self.campaign, self.poutcome
        )
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A candidate whose scoring fails counts as score 0 and the scan goes on.
    #[default]
    Skip,
    /// The first scoring failure aborts the search.
    Escalate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchOutcome {
    pub best: Option<Candidate>,
    pub score: f64,
    pub evaluated: usize,
    pub failed: usize,
}

impl SearchOutcome {
    pub fn empty() -> Self {
        Self {
            best: None,
            score: 0.0,
            evaluated: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("option list for {0} is empty")]
    EmptyOptions(TunableField),
    #[error("scoring failed for candidate [{candidate}]: {source}")]
    Scoring {
        candidate: Candidate,
        #[source]
        source: ScoringError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterChange {
    pub field: TunableField,
    pub from: String,
    pub to: String,
}

impl Display for ParameterChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "change {} from {} to {}", self.field, self.from, self.to)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinimalChange {
    pub change: Option<ParameterChange>,
    pub probability: f64,
    pub original_probability: f64,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    Duration,
    Campaign,
}

impl Display for SensitivityParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration => write!(f, "Duration (s)"),
            Self::Campaign => write!(f, "Campaign Contacts"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensitivityPoint {
    pub parameter: SensitivityParameter,
    pub value: u32,
    pub probability: f64,
}

pub(crate) fn is_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_space_has_3600_candidates() {
        let space = SearchSpace::default();
        assert_eq!(space.size(), 3 * 12 * 5 * 5 * 4);
        assert_eq!(space.candidates().count(), space.size());
    }

    #[test]
    fn candidates_enumerate_lexicographically() {
        let space = SearchSpace {
            contact: vec![Contact::Cellular, Contact::Telephone],
            month: vec![Month::Mar],
            duration: vec![100, 300],
            campaign: vec![1],
            poutcome: vec![PreviousOutcome::Success, PreviousOutcome::Failure],
        };
        let order = space
            .candidates()
            .map(|c| (c.contact, c.duration, c.poutcome))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                (Contact::Cellular, 100, PreviousOutcome::Success),
                (Contact::Cellular, 100, PreviousOutcome::Failure),
                (Contact::Cellular, 300, PreviousOutcome::Success),
                (Contact::Cellular, 300, PreviousOutcome::Failure),
                (Contact::Telephone, 100, PreviousOutcome::Success),
                (Contact::Telephone, 100, PreviousOutcome::Failure),
                (Contact::Telephone, 300, PreviousOutcome::Success),
                (Contact::Telephone, 300, PreviousOutcome::Failure),
            ]
        );
    }

    #[test]
    fn empty_option_list_is_reported() {
        let space = SearchSpace {
            campaign: Vec::new(),
            ..SearchSpace::default()
        };
        assert!(matches!(
            space.validate(),
            Err(SearchError::EmptyOptions(TunableField::Campaign))
        ));
    }

    #[test]
    fn candidate_keeps_untouched_fields() {
        let base = ClientRecord::sample();
        let candidate = Candidate {
            contact: Contact::Telephone,
            month: Month::Dec,
            duration: 1500,
            campaign: 7,
            poutcome: PreviousOutcome::Other,
        };
        let record = candidate.apply_to(&base);
        assert_eq!(record.month, Month::Dec);
        assert_eq!(record.age, base.age);
        assert_eq!(record.pdays, base.pdays);
    }
}
