use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    diagnosis::{DiagnosisSession, Generation},
    error::{DiagnoseError, ScheduleInputError, WorkflowError},
    models::{Diagnosis, ImageHandle, ScheduledTreatment, Treatment},
    monitor::ProgressLog,
    schedule::TreatmentScheduleStore,
};

use super::selection::TreatmentSelection;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Capture,
    Analyzing,
    Results,
    Treatments,
    Monitor,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Capture => "Scan Crop",
            Page::Analyzing => "Analyzing Image",
            Page::Results => "Diagnosis",
            Page::Treatments => "Treatments",
            Page::Monitor => "Monitor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "capture" | "camera" | "scan" => Some(Page::Capture),
            "analyzing" => Some(Page::Analyzing),
            "results" | "diagnosis" => Some(Page::Results),
            "treatments" => Some(Page::Treatments),
            "monitor" => Some(Page::Monitor),
            _ => None,
        }
    }

    /// Pages a capture may be started from. Capturing while analysing
    /// supersedes the in-flight attempt.
    pub fn accepts_capture(&self) -> bool {
        matches!(self, Page::Capture | Page::Analyzing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Page,
    pub to: Page,
    /// Analysis abandoned by leaving the analyzing page.
    pub cancelled: Option<Generation>,
}

/// Read-only summary published after every state change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub page: Page,
    pub generation: Generation,
    pub analyzing: bool,
    pub diagnosis_id: Option<String>,
    pub scheduled_count: usize,
    pub last_error: Option<String>,
}

/// The workflow's single source of truth. Every mutation goes through one of
/// the command methods below.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    page: Page,
    session: DiagnosisSession,
    schedule: TreatmentScheduleStore,
    selection: TreatmentSelection,
    progress: ProgressLog,
    default_field_size: String,
    last_error: Option<WorkflowError>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new("1")
    }
}

impl WorkflowState {
    pub fn new(default_field_size: impl Into<String>) -> Self {
        let default_field_size = default_field_size.into();
        Self {
            page: Page::Capture,
            session: DiagnosisSession::new(),
            schedule: TreatmentScheduleStore::new(),
            selection: TreatmentSelection::new(default_field_size.clone()),
            progress: ProgressLog::new(),
            default_field_size,
            last_error: None,
        }
    }

    pub fn capture(&mut self, image: ImageHandle) -> Result<Generation, WorkflowError> {
        if !self.page.accepts_capture() {
            return Err(WorkflowError::IllegalTransition {
                from: self.page,
                to: Page::Analyzing,
            });
        }

        let generation = self.session.begin_capture(image);
        self.page = Page::Analyzing;
        self.selection = TreatmentSelection::new(self.default_field_size.clone());
        self.last_error = None;
        Ok(generation)
    }

    /// Resume after the analysis for `generation` resolved. Stale
    /// completions are dropped and `false` is returned.
    pub fn on_diagnosis_ready(&mut self, generation: Generation, diagnosis: Arc<Diagnosis>) -> bool {
        if !self.session.complete_analysis(generation, diagnosis) {
            return false;
        }
        self.page = Page::Results;
        true
    }

    /// Route a failed analysis back to capture. Returns the error to surface,
    /// or `None` when the failure belongs to a superseded capture.
    pub fn on_diagnosis_failed(
        &mut self,
        generation: Generation,
        error: DiagnoseError,
    ) -> Option<WorkflowError> {
        if !self.session.fail_analysis(generation) {
            return None;
        }
        let error = WorkflowError::DiagnosisFailed(error);
        self.page = Page::Capture;
        self.last_error = Some(error.clone());
        Some(error)
    }

    pub fn navigate(&mut self, to: Page) -> Result<Transition, WorkflowError> {
        let from = self.page;
        if to == Page::Analyzing && from != Page::Analyzing {
            return Err(WorkflowError::IllegalTransition { from, to });
        }

        let cancelled = if from == Page::Analyzing && to != Page::Analyzing {
            self.session.cancel_analysis()
        } else {
            None
        };

        if to == Page::Capture {
            self.session.reset();
        }

        self.page = to;
        Ok(Transition {
            from,
            to,
            cancelled,
        })
    }

    /// Schedule `treatment` from `start_date`. Dates before `today` are
    /// rejected and nothing is recorded.
    pub fn schedule_treatment(
        &mut self,
        treatment: &Treatment,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ScheduledTreatment, WorkflowError> {
        if start_date < today {
            return Err(ScheduleInputError::StartDateInPast {
                start: start_date,
                today,
            }
            .into());
        }
        Ok(self.schedule.schedule(treatment, start_date))
    }

    /// Schedule a treatment of the active diagnosis by id.
    pub fn schedule_by_id(
        &mut self,
        treatment_id: &str,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ScheduledTreatment, WorkflowError> {
        let treatment = self.active_treatment(treatment_id)?.clone();
        self.schedule_treatment(&treatment, start_date, today)
    }

    pub fn set_field_size(&mut self, input: impl Into<String>) {
        self.selection.set_field_size(input);
    }

    pub fn select_treatment(&mut self, treatment_id: &str) -> Result<(), WorkflowError> {
        self.active_treatment(treatment_id)?;
        self.selection.select(treatment_id);
        Ok(())
    }

    pub fn toggle_compare(&mut self, treatment_id: &str) -> Result<bool, WorkflowError> {
        self.active_treatment(treatment_id)?;
        Ok(self.selection.toggle_compare(treatment_id))
    }

    pub fn record_progress_photo(&mut self, photo: ImageHandle) -> usize {
        self.progress.record(photo)
    }

    /// Reinstate a saved session. Lands on the monitor when a diagnosis is
    /// available, otherwise on capture.
    pub fn restore(&mut self, diagnosis: Option<Arc<Diagnosis>>, scheduled: Vec<ScheduledTreatment>) {
        self.page = if diagnosis.is_some() {
            Page::Monitor
        } else {
            Page::Capture
        };
        self.session.restore(diagnosis);
        self.schedule = TreatmentScheduleStore::from_entries(scheduled);
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            page: self.page,
            generation: self.session.generation(),
            analyzing: self.session.is_analyzing(),
            diagnosis_id: self.session.diagnosis().map(|d| d.id.clone()),
            scheduled_count: self.schedule.len(),
            last_error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn session(&self) -> &DiagnosisSession {
        &self.session
    }

    pub fn schedule(&self) -> &TreatmentScheduleStore {
        &self.schedule
    }

    pub fn selection(&self) -> &TreatmentSelection {
        &self.selection
    }

    pub fn progress(&self) -> &ProgressLog {
        &self.progress
    }

    pub fn last_error(&self) -> Option<&WorkflowError> {
        self.last_error.as_ref()
    }

    fn active_treatment(&self, treatment_id: &str) -> Result<&Treatment, WorkflowError> {
        self.session
            .diagnosis()
            .and_then(|d| d.treatment(treatment_id))
            .ok_or_else(|| ScheduleInputError::UnknownTreatment(treatment_id.to_string()).into())
    }
}

pub fn parse_start_date(input: &str) -> Result<NaiveDate, ScheduleInputError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleInputError::UnparseableDate(input.trim().to_string()))
}
