use chrono::NaiveDate;

use crate::models::{ScheduledTreatment, Treatment};

use super::calculator::next_application_after;

/// Append-only record of scheduled treatments, kept in scheduling order.
#[derive(Debug, Clone, Default)]
pub struct TreatmentScheduleStore {
    entries: Vec<ScheduledTreatment>,
}

impl TreatmentScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously exported entries, preserving order.
    pub fn from_entries(entries: Vec<ScheduledTreatment>) -> Self {
        Self { entries }
    }

    /// Schedule `treatment` starting on `start_date`. Repeated calls for the
    /// same treatment produce independent entries.
    pub fn schedule(&mut self, treatment: &Treatment, start_date: NaiveDate) -> ScheduledTreatment {
        let entry = ScheduledTreatment {
            treatment_id: treatment.id.clone(),
            treatment_name: treatment.name.clone(),
            start_date,
            frequency: treatment.frequency.clone(),
            next_application_date: next_application_after(start_date, treatment.frequency_days),
        };
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[ScheduledTreatment] {
        &self.entries
    }

    pub fn for_treatment<'a>(
        &'a self,
        treatment_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduledTreatment> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.treatment_id == treatment_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diagnosis::fixtures::treatment;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schedule_projects_next_date_and_snapshots_fields() {
        let mut store = TreatmentScheduleStore::new();
        let neem = treatment("treat-001", "7 days", 600.0);

        let entry = store.schedule(&neem, date(2024, 3, 1));

        assert_eq!(entry.treatment_id, "treat-001");
        assert_eq!(entry.treatment_name, neem.name);
        assert_eq!(entry.frequency, "7 days");
        assert_eq!(entry.next_application_date, date(2024, 3, 8));
        assert_eq!(store.entries(), &[entry]);
    }

    #[test]
    fn rescheduling_is_additive() {
        let mut store = TreatmentScheduleStore::new();
        let copper = treatment("treat-006", "7 days", 800.0);

        let first = store.schedule(&copper, date(2024, 3, 1));
        let second = store.schedule(&copper, date(2024, 3, 5));

        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0], first);
        assert_eq!(store.entries()[1], second);
        assert_eq!(second.next_application_date, date(2024, 3, 12));
        assert_eq!(store.for_treatment("treat-006").count(), 2);
    }

    #[test]
    fn snapshot_survives_treatment_changes() {
        let mut store = TreatmentScheduleStore::new();
        let mut soda = treatment("treat-007", "5 days", 100.0);
        store.schedule(&soda, date(2024, 4, 1));

        soda.name = "Renamed".into();

        assert_eq!(store.entries()[0].treatment_name, "Treatment treat-007");
    }
}
