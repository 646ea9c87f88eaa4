use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A confirmed commitment to apply a treatment. Name and frequency are
/// snapshots taken at scheduling time, not live catalog references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTreatment {
    pub treatment_id: String,
    pub treatment_name: String,
    pub start_date: NaiveDate,
    pub frequency: String,
    pub next_application_date: NaiveDate,
}
