use serde::{Deserialize, Serialize};

use crate::schedule::calculator::parse_frequency_days;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TreatmentCategory {
    Organic,
    Chemical,
    Traditional,
}

impl TreatmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentCategory::Organic => "Organic",
            TreatmentCategory::Chemical => "Chemical",
            TreatmentCategory::Traditional => "Traditional",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Effectiveness {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High", alias = "VeryHigh")]
    VeryHigh,
}

impl Effectiveness {
    /// Fixed display score; never derived from field data.
    pub fn score(&self) -> u8 {
        match self {
            Effectiveness::Low => 40,
            Effectiveness::Medium => 60,
            Effectiveness::High => 80,
            Effectiveness::VeryHigh => 95,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Effectiveness::Low => "Low",
            Effectiveness::Medium => "Medium",
            Effectiveness::High => "High",
            Effectiveness::VeryHigh => "Very High",
        }
    }
}

/// A single remediation option. `frequency_days` is derived from `frequency`
/// once, when the treatment is ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "TreatmentRecord")]
pub struct Treatment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: TreatmentCategory,
    pub effectiveness: Effectiveness,
    pub cost_per_acre: f64,
    pub application: String,
    pub instructions: String,
    pub frequency: String,
    pub frequency_days: u32,
}

/// Wire shape of a treatment as it appears in catalog data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreatmentRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    category: TreatmentCategory,
    effectiveness: Effectiveness,
    cost_per_acre: f64,
    application: String,
    instructions: String,
    frequency: String,
}

impl From<TreatmentRecord> for Treatment {
    fn from(record: TreatmentRecord) -> Self {
        let cost_per_acre = if record.cost_per_acre.is_finite() {
            record.cost_per_acre.max(0.0)
        } else {
            0.0
        };

        Self {
            frequency_days: parse_frequency_days(&record.frequency),
            id: record.id,
            name: record.name,
            category: record.category,
            effectiveness: record.effectiveness,
            cost_per_acre,
            application: record.application,
            instructions: record.instructions,
            frequency: record.frequency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub id: String,
    pub name: String,
    pub confidence: u8,
    pub severity: Severity,
    pub crop: String,
    pub description: String,
    pub symptoms: Vec<String>,
    /// Recommendation order; index 0 is the top choice.
    pub treatments: Vec<Treatment>,
}

impl Diagnosis {
    pub fn top_choice(&self) -> Option<&Treatment> {
        self.treatments.first()
    }

    pub fn treatment(&self, treatment_id: &str) -> Option<&Treatment> {
        self.treatments.iter().find(|t| t.id == treatment_id)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{diagnosis, treatment};
    use super::*;

    #[test]
    fn top_choice_follows_input_order() {
        let a = treatment("a", "7 days", 600.0);
        let b = treatment("b", "10 days", 1200.0);

        let first = diagnosis("d", vec![a.clone(), b.clone()]);
        assert_eq!(first.top_choice().map(|t| t.id.as_str()), Some("a"));

        let reordered = diagnosis("d", vec![b, a]);
        assert_eq!(reordered.top_choice().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn top_choice_is_none_without_treatments() {
        assert!(diagnosis("d", Vec::new()).top_choice().is_none());
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn effectiveness_scores_are_fixed() {
        assert_eq!(Effectiveness::Low.score(), 40);
        assert_eq!(Effectiveness::Medium.score(), 60);
        assert_eq!(Effectiveness::High.score(), 80);
        assert_eq!(Effectiveness::VeryHigh.score(), 95);
    }

    #[test]
    fn ingestion_parses_frequency_and_clamps_cost() {
        let json = r#"{
            "id": "treat-x",
            "name": "Resistant Varieties",
            "type": "Organic",
            "effectiveness": "Very High",
            "costPerAcre": -20,
            "application": "Next season",
            "instructions": "Plant resistant seed.",
            "frequency": "Seasonal"
        }"#;

        let parsed: Treatment = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.effectiveness, Effectiveness::VeryHigh);
        assert_eq!(parsed.category, TreatmentCategory::Organic);
        assert_eq!(parsed.frequency_days, 7);
        assert_eq!(parsed.cost_per_acre, 0.0);
    }
}
