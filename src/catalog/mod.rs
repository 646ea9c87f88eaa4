use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::Diagnosis;

const BUILTIN_DISEASES: &str = include_str!("diseases.json");

/// Read-only lookup of known diseases and their ranked treatments.
#[cfg_attr(test, mockall::automock)]
pub trait TreatmentCatalog: Send + Sync {
    fn lookup(&self, disease_id: &str) -> Option<Arc<Diagnosis>>;

    fn diseases(&self) -> Vec<Arc<Diagnosis>>;
}

/// In-memory catalog. Entries keep the order they were loaded in.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    diseases: Vec<Arc<Diagnosis>>,
}

impl StaticCatalog {
    /// The reference data bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DISEASES).context("bundled disease catalog is malformed")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let diseases: Vec<Diagnosis> =
            serde_json::from_str(json).context("failed to parse disease catalog")?;
        Ok(Self::from_diseases(diseases))
    }

    pub fn from_diseases(diseases: Vec<Diagnosis>) -> Self {
        Self {
            diseases: diseases.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }
}

impl TreatmentCatalog for StaticCatalog {
    fn lookup(&self, disease_id: &str) -> Option<Arc<Diagnosis>> {
        self.diseases.iter().find(|d| d.id == disease_id).cloned()
    }

    fn diseases(&self) -> Vec<Arc<Diagnosis>> {
        self.diseases.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Effectiveness;

    #[test]
    fn builtin_catalog_loads_all_diseases() {
        let catalog = StaticCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);

        let armyworm = catalog.lookup("faw-001").unwrap();
        assert_eq!(armyworm.name, "Fall Armyworm");
        assert_eq!(armyworm.confidence, 95);
        assert_eq!(armyworm.treatments.len(), 3);
        assert_eq!(armyworm.top_choice().unwrap().id, "treat-001");
        assert_eq!(armyworm.treatments[1].effectiveness, Effectiveness::VeryHigh);
        assert_eq!(armyworm.treatments[1].frequency_days, 10);
    }

    #[test]
    fn non_numeric_frequencies_default_on_ingest() {
        let catalog = StaticCatalog::builtin().unwrap();
        let mln = catalog.lookup("mln-001").unwrap();
        assert!(mln.treatments.iter().all(|t| t.frequency_days == 7));
    }

    #[test]
    fn unknown_id_is_none() {
        let catalog = StaticCatalog::builtin().unwrap();
        assert!(catalog.lookup("rust-999").is_none());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(StaticCatalog::from_json("{not json").is_err());
    }
}
