pub mod session;
pub mod simulated;

use std::{future::Future, sync::Arc};

use crate::{
    error::DiagnoseError,
    models::{Diagnosis, ImageHandle},
    settings::ProcessingMode,
};

pub use session::{DiagnosisSession, Generation};
pub use simulated::SimulatedDiagnoser;

/// Turns a captured image into a diagnosis. Resolves exactly once per call.
pub trait Diagnose: Send + Sync {
    fn diagnose(
        &self,
        image: ImageHandle,
        mode: ProcessingMode,
    ) -> impl Future<Output = Result<Arc<Diagnosis>, DiagnoseError>> + Send;
}
