use serde::{Deserialize, Serialize};

use crate::{
    cost::{aggregate_cost, parse_field_size, total_cost},
    models::{Diagnosis, Treatment},
};

pub const MAX_COMPARED: usize = 3;

/// Cost-calculator and comparison choices on the treatments page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentSelection {
    pub field_size_input: String,
    pub selected: Option<String>,
    pub compared: Vec<String>,
}

impl TreatmentSelection {
    pub fn new(default_field_size: impl Into<String>) -> Self {
        Self {
            field_size_input: default_field_size.into(),
            selected: None,
            compared: Vec::new(),
        }
    }

    pub fn field_size(&self) -> u64 {
        parse_field_size(&self.field_size_input)
    }

    pub fn set_field_size(&mut self, input: impl Into<String>) {
        self.field_size_input = input.into();
    }

    pub fn select(&mut self, treatment_id: impl Into<String>) {
        self.selected = Some(treatment_id.into());
    }

    /// Add or remove a treatment from the comparison set. Returns whether the
    /// treatment is compared afterwards; adding past [`MAX_COMPARED`] is a
    /// no-op.
    pub fn toggle_compare(&mut self, treatment_id: &str) -> bool {
        if let Some(pos) = self.compared.iter().position(|id| id == treatment_id) {
            self.compared.remove(pos);
            return false;
        }
        if self.compared.len() >= MAX_COMPARED {
            return false;
        }
        self.compared.push(treatment_id.to_string());
        true
    }

    pub fn selected_treatment<'a>(&self, diagnosis: &'a Diagnosis) -> Option<&'a Treatment> {
        self.selected
            .as_deref()
            .and_then(|id| diagnosis.treatment(id))
    }

    /// Total for the selected treatment, or `None` when nothing (or nothing
    /// belonging to `diagnosis`) is selected.
    pub fn selected_total(&self, diagnosis: &Diagnosis) -> Option<f64> {
        self.selected_treatment(diagnosis)
            .map(|t| total_cost(self.field_size(), t.cost_per_acre))
    }

    pub fn compared_treatments<'a>(&self, diagnosis: &'a Diagnosis) -> Vec<&'a Treatment> {
        self.compared
            .iter()
            .filter_map(|id| diagnosis.treatment(id))
            .collect()
    }

    pub fn compared_total(&self, diagnosis: &Diagnosis) -> f64 {
        aggregate_cost(self.field_size(), self.compared_treatments(diagnosis))
    }
}
