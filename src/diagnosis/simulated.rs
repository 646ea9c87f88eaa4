use std::sync::{Arc, Mutex};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    catalog::TreatmentCatalog,
    error::DiagnoseError,
    models::{Diagnosis, ImageHandle},
    settings::{LatencyProfile, ProcessingMode},
};

use super::Diagnose;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Stand-in for real inference: waits out the mode's latency, then picks a
/// catalog disease at random.
pub struct SimulatedDiagnoser<C> {
    catalog: Arc<C>,
    latency: LatencyProfile,
    rng: Mutex<StdRng>,
}

impl<C: TreatmentCatalog> SimulatedDiagnoser<C> {
    pub fn new(catalog: Arc<C>, latency: LatencyProfile) -> Self {
        Self {
            catalog,
            latency,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic picks, for tests and reproducible demos.
    pub fn with_seed(catalog: Arc<C>, latency: LatencyProfile, seed: u64) -> Self {
        Self {
            catalog,
            latency,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self) -> Option<Arc<Diagnosis>> {
        let candidates = self.catalog.diseases();
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        candidates.choose(&mut *rng).cloned()
    }
}

impl<C: TreatmentCatalog + 'static> Diagnose for SimulatedDiagnoser<C> {
    async fn diagnose(
        &self,
        image: ImageHandle,
        mode: ProcessingMode,
    ) -> Result<Arc<Diagnosis>, DiagnoseError> {
        if image.source.trim().is_empty() {
            return Err(DiagnoseError::ImageUnreadable);
        }

        let delay = self.latency.for_mode(mode);
        log_debug!("simulating {:?} analysis of {} ({:?})", mode, image.id, delay);
        tokio::time::sleep(delay).await;

        let diagnosis = self.pick().ok_or(DiagnoseError::NoCandidates)?;
        log_info!(
            "image {} diagnosed as {} ({}% confidence)",
            image.id,
            diagnosis.name,
            diagnosis.confidence
        );
        Ok(diagnosis)
    }
}
