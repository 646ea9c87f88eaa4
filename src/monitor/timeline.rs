use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::ScheduledTreatment;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimelineStatus {
    Completed,
    Due,
    Upcoming,
}

impl TimelineStatus {
    fn relative_to(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => TimelineStatus::Completed,
            std::cmp::Ordering::Equal => TimelineStatus::Due,
            std::cmp::Ordering::Greater => TimelineStatus::Upcoming,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TimelineEvent {
    /// First application of a scheduled treatment.
    Application { treatment_id: String, treatment_name: String },
    /// Projected follow-up application.
    NextApplication { treatment_id: String, treatment_name: String },
    Checkup,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub status: TimelineStatus,
    pub event: TimelineEvent,
}

/// Date-ordered monitoring timeline. Entries on the same date keep the order
/// in which their treatments were scheduled, with the checkup last.
pub fn build_timeline(
    scheduled: &[ScheduledTreatment],
    today: NaiveDate,
    checkup: Option<NaiveDate>,
) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = scheduled
        .iter()
        .flat_map(|entry| {
            [
                (
                    entry.start_date,
                    TimelineEvent::Application {
                        treatment_id: entry.treatment_id.clone(),
                        treatment_name: entry.treatment_name.clone(),
                    },
                ),
                (
                    entry.next_application_date,
                    TimelineEvent::NextApplication {
                        treatment_id: entry.treatment_id.clone(),
                        treatment_name: entry.treatment_name.clone(),
                    },
                ),
            ]
        })
        .chain(checkup.map(|date| (date, TimelineEvent::Checkup)))
        .map(|(date, event)| TimelineEntry {
            date,
            status: TimelineStatus::relative_to(date, today),
            event,
        })
        .collect();

    // stable: ties keep insertion order
    entries.sort_by_key(|entry| entry.date);
    entries
}
