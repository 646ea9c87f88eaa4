use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    cost::{cost_label, format_amount, total_cost},
    models::{Diagnosis, ImageHandle, ScheduledTreatment, Treatment},
    monitor::{build_timeline, next_checkup, TimelineEntry, TimelineEvent, TimelineStatus},
    settings::{ProcessingMode, Settings},
};

use super::{state::WorkflowState, Page};

/// Read-only rendering input for the current page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "view")]
pub enum PageView {
    Capture {
        mode: ProcessingMode,
        last_error: Option<String>,
    },
    Analyzing {
        message: String,
    },
    Results(ResultsView),
    Treatments(TreatmentsView),
    Monitor(MonitorView),
    /// A diagnosis-dependent page was opened before any diagnosis exists.
    NoActiveDiagnosis {
        page: Page,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub diagnosis: Diagnosis,
    pub image: Option<ImageHandle>,
    pub top_choice: Option<Treatment>,
    pub mode_status: String,
    pub external_search_available: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentOption {
    pub rank: usize,
    pub treatment: Treatment,
    pub effectiveness_score: u8,
    pub cost_label: String,
    pub total_cost: f64,
    pub selected: bool,
    pub compared: bool,
    /// Applications already scheduled for this treatment.
    pub scheduled_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentsView {
    pub disease_name: String,
    pub field_size_input: String,
    pub field_size: u64,
    pub currency: String,
    pub options: Vec<TreatmentOption>,
    pub selected_total: Option<f64>,
    pub compared: Vec<TreatmentOption>,
    pub compared_total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorView {
    pub crop: String,
    pub disease_name: String,
    pub scheduled: Vec<ScheduledTreatment>,
    pub timeline: Vec<TimelineEntry>,
    pub next_checkup: NaiveDate,
    pub recovery_day: u32,
    pub recovery_window_days: u32,
    pub photo_count: usize,
    pub photos: Vec<ImageHandle>,
    pub comparison: Option<(ImageHandle, ImageHandle)>,
}

impl WorkflowState {
    pub fn view(&self, today: NaiveDate, settings: &Settings) -> PageView {
        let page = self.page();
        let diagnosis = self.session().diagnosis();

        match (page, diagnosis) {
            (Page::Capture, _) => PageView::Capture {
                mode: settings.mode,
                last_error: self.last_error().map(ToString::to_string),
            },
            (Page::Analyzing, _) => PageView::Analyzing {
                message: settings.mode.status_message().to_string(),
            },
            (Page::Results, Some(diagnosis)) => PageView::Results(ResultsView {
                diagnosis: diagnosis.as_ref().clone(),
                image: self.session().image().cloned(),
                top_choice: diagnosis.top_choice().cloned(),
                mode_status: settings.mode.status_message().to_string(),
                external_search_available: settings.mode.allows_external_search(),
            }),
            (Page::Treatments, Some(diagnosis)) => {
                PageView::Treatments(self.treatments_view(diagnosis, settings))
            }
            (Page::Monitor, Some(diagnosis)) => {
                PageView::Monitor(self.monitor_view(diagnosis, today, settings))
            }
            (page, None) => PageView::NoActiveDiagnosis { page },
        }
    }

    fn treatments_view(&self, diagnosis: &Diagnosis, settings: &Settings) -> TreatmentsView {
        let selection = self.selection();
        let field_size = selection.field_size();

        let option = |rank: usize, treatment: &Treatment| TreatmentOption {
            rank,
            treatment: treatment.clone(),
            effectiveness_score: treatment.effectiveness.score(),
            cost_label: cost_label(treatment.cost_per_acre, &settings.currency),
            total_cost: total_cost(field_size, treatment.cost_per_acre),
            selected: selection.selected.as_deref() == Some(treatment.id.as_str()),
            compared: selection.compared.iter().any(|id| id == &treatment.id),
            scheduled_count: self.schedule().for_treatment(&treatment.id).count(),
        };

        let options: Vec<TreatmentOption> = diagnosis
            .treatments
            .iter()
            .enumerate()
            .map(|(idx, t)| option(idx + 1, t))
            .collect();

        // comparison rows follow the order treatments were added
        let compared = selection
            .compared
            .iter()
            .filter_map(|id| options.iter().find(|o| &o.treatment.id == id))
            .cloned()
            .collect();

        TreatmentsView {
            disease_name: diagnosis.name.clone(),
            field_size_input: selection.field_size_input.clone(),
            field_size,
            currency: settings.currency.clone(),
            options,
            selected_total: selection.selected_total(diagnosis),
            compared,
            compared_total: selection.compared_total(diagnosis),
        }
    }

    fn monitor_view(&self, diagnosis: &Diagnosis, today: NaiveDate, settings: &Settings) -> MonitorView {
        let scheduled = self.schedule().entries().to_vec();
        let checkup = next_checkup(today, settings.checkup_interval_days);
        let progress = self.progress();

        MonitorView {
            crop: diagnosis.crop.clone(),
            disease_name: diagnosis.name.clone(),
            timeline: build_timeline(&scheduled, today, Some(checkup)),
            scheduled,
            next_checkup: checkup,
            recovery_day: progress.recovery_day(settings.recovery_window_days),
            recovery_window_days: settings.recovery_window_days,
            photo_count: progress.len(),
            photos: progress.photos().to_vec(),
            comparison: progress
                .comparison()
                .map(|(first, latest)| (first.clone(), latest.clone())),
        }
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageView::Capture { mode, last_error } => {
                writeln!(f, "== {} ==", Page::Capture.title())?;
                writeln!(f, "Mode: {mode:?}")?;
                if let Some(err) = last_error {
                    writeln!(f, "Last attempt failed: {err}. Try again.")?;
                }
                write!(f, "Use `capture <path>` to analyse a leaf photo.")
            }
            PageView::Analyzing { message } => {
                writeln!(f, "== {} ==", Page::Analyzing.title())?;
                write!(f, "{message}")
            }
            PageView::Results(view) => view.fmt(f),
            PageView::Treatments(view) => view.fmt(f),
            PageView::Monitor(view) => view.fmt(f),
            PageView::NoActiveDiagnosis { page } => {
                writeln!(f, "== {} ==", page.title())?;
                write!(f, "No active diagnosis. Capture a crop image first.")
            }
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.diagnosis;
        writeln!(f, "== {} ==", Page::Results.title())?;
        writeln!(f, "{} on {} ({}% confidence)", d.name, d.crop, d.confidence)?;
        writeln!(f, "Severity: {}", d.severity.as_str())?;
        writeln!(f, "{}", d.description)?;
        for symptom in &d.symptoms {
            writeln!(f, "  - {symptom}")?;
        }
        if let Some(top) = &self.top_choice {
            writeln!(f, "Top choice: {} ({})", top.name, top.effectiveness.as_str())?;
        }
        if self.external_search_available {
            writeln!(f, "External search available.")?;
        }
        write!(f, "{}", self.mode_status)
    }
}

impl fmt::Display for TreatmentsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {}: {} ==", Page::Treatments.title(), self.disease_name)?;
        writeln!(f, "Field size: {} acre(s)", self.field_size)?;
        for option in &self.options {
            let marker = match (option.selected, option.compared) {
                (true, _) => '*',
                (false, true) => '+',
                (false, false) => ' ',
            };
            writeln!(
                f,
                "{marker}{}. {} [{}] {} | {} | {}% | total {} {}",
                option.rank,
                option.treatment.name,
                option.treatment.id,
                option.treatment.category.as_str(),
                option.cost_label,
                option.effectiveness_score,
                self.currency,
                format_amount(option.total_cost)
            )?;
            if option.scheduled_count > 0 {
                writeln!(f, "    scheduled {} time(s)", option.scheduled_count)?;
            }
        }
        if let Some(total) = self.selected_total {
            writeln!(f, "Selected total: {} {}", self.currency, format_amount(total))?;
        }
        if !self.compared.is_empty() {
            writeln!(
                f,
                "Comparing {} treatment(s): {} {}",
                self.compared.len(),
                self.currency,
                format_amount(self.compared_total)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for MonitorView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {}: {} ({}) ==", Page::Monitor.title(), self.crop, self.disease_name)?;
        writeln!(
            f,
            "Recovery day {} of {}, {} progress photo(s)",
            self.recovery_day, self.recovery_window_days, self.photo_count
        )?;
        if let Some(latest) = self.photos.last() {
            writeln!(f, "Latest photo: {}", latest.source)?;
        }
        if let Some((first, latest)) = &self.comparison {
            writeln!(f, "Before/after: {} -> {}", first.source, latest.source)?;
        }
        if self.scheduled.is_empty() {
            writeln!(f, "No treatments scheduled.")?;
        }
        for entry in &self.scheduled {
            writeln!(
                f,
                "{}: started {}, {}, next {}",
                entry.treatment_name, entry.start_date, entry.frequency, entry.next_application_date
            )?;
        }
        writeln!(f, "Timeline:")?;
        for entry in &self.timeline {
            let status = match entry.status {
                TimelineStatus::Completed => "done",
                TimelineStatus::Due => "due",
                TimelineStatus::Upcoming => "upcoming",
            };
            let label = match &entry.event {
                TimelineEvent::Application { treatment_name, .. } => {
                    format!("{treatment_name} applied")
                }
                TimelineEvent::NextApplication { treatment_name, .. } => {
                    format!("{treatment_name} application due")
                }
                TimelineEvent::Checkup => "Crop checkup".to_string(),
            };
            writeln!(f, "  {} {label} ({status})", entry.date)?;
        }
        write!(f, "Next checkup: {}", self.next_checkup)
    }
}
