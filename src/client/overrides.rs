use serde::{Deserialize, Serialize};

use crate::client::{
    ClientRecord, Contact, Education, Job, Marital, Month, PreviousOutcome, YesNo,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientOverrides {
    pub age: Option<u32>,
    pub job: Option<Job>,
    pub marital: Option<Marital>,
    pub education: Option<Education>,
    #[serde(rename = "default")]
    pub credit_default: Option<YesNo>,
    pub balance: Option<i64>,
    pub housing: Option<YesNo>,
    pub loan: Option<YesNo>,
    pub contact: Option<Contact>,
    pub day: Option<u32>,
    pub month: Option<Month>,
    pub duration: Option<u32>,
    pub campaign: Option<u32>,
    pub pdays: Option<i32>,
    pub previous: Option<u32>,
    pub poutcome: Option<PreviousOutcome>,
}

impl ClientOverrides {
    pub fn into_record(self) -> ClientRecord {
        let mut record = ClientRecord::sample();
        apply_overrides(&mut record, &self);
        record
    }
}

pub fn apply_overrides(record: &mut ClientRecord, overrides: &ClientOverrides) {
    if let Some(v) = overrides.age {
        record.age = v;
    }
    if let Some(v) = overrides.job {
        record.job = v;
    }
    if let Some(v) = overrides.marital {
        record.marital = v;
    }
    if let Some(v) = overrides.education {
        record.education = v;
    }
    if let Some(v) = overrides.credit_default {
        record.credit_default = v;
    }
    if let Some(v) = overrides.balance {
        record.balance = v;
    }
    if let Some(v) = overrides.housing {
        record.housing = v;
    }
    if let Some(v) = overrides.loan {
        record.loan = v;
    }
    if let Some(v) = overrides.contact {
        record.contact = v;
    }
    if let Some(v) = overrides.day {
        record.day = v;
    }
    if let Some(v) = overrides.month {
        record.month = v;
    }
    if let Some(v) = overrides.duration {
        record.duration = v;
    }
    if let Some(v) = overrides.campaign {
        record.campaign = v;
    }
    if let Some(v) = overrides.pdays {
        record.pdays = v;
    }
    if let Some(v) = overrides.previous {
        record.previous = v;
    }
    if let Some(v) = overrides.poutcome {
        record.poutcome = v;
    }
}
