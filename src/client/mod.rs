pub mod overrides;
pub mod schema;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use overrides::{apply_overrides, ClientOverrides};
pub use schema::{
    CategoryParseError, Contact, Education, Job, Marital, Month, PreviousOutcome, YesNo,
};
pub use validate::{validate_record, ValidationIssue};

/// Columns a tabular upload must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 16] = [
    "age",
    "job",
    "marital",
    "education",
    "default",
    "balance",
    "housing",
    "loan",
    "contact",
    "day",
    "month",
    "duration",
    "campaign",
    "pdays",
    "previous",
    "poutcome",
];

/// `pdays` value meaning the client was never contacted in a previous campaign.
pub const NEVER_CONTACTED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub age: u32,
    pub job: Job,
    pub marital: Marital,
    pub education: Education,
    #[serde(rename = "default")]
    pub credit_default: YesNo,
    pub balance: i64,
    pub housing: YesNo,
    pub loan: YesNo,
    pub contact: Contact,
    pub day: u32,
    pub month: Month,
    pub duration: u32,
    pub campaign: u32,
    pub pdays: i32,
    pub previous: u32,
    pub poutcome: PreviousOutcome,
}

impl ClientRecord {
    pub fn sample() -> Self {
        Self {
            age: 41,
            job: Job::Management,
            marital: Marital::Married,
            education: Education::Tertiary,
            credit_default: YesNo::No,
            balance: 1_500,
            housing: YesNo::No,
            loan: YesNo::No,
            contact: Contact::Cellular,
            day: 15,
            month: Month::May,
            duration: 260,
            campaign: 2,
            pdays: NEVER_CONTACTED,
            previous: 0,
            poutcome: PreviousOutcome::Unknown,
        }
    }

    pub fn was_contacted_before(&self) -> bool {
        self.pdays != NEVER_CONTACTED
    }
}

impl Default for ClientRecord {
    fn default() -> Self {
        Self::sample()
    }
}
