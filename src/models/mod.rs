pub mod diagnosis;
pub mod image;
pub mod schedule;

pub use diagnosis::{Diagnosis, Effectiveness, Severity, Treatment, TreatmentCategory};
pub use image::ImageHandle;
pub use schedule::ScheduledTreatment;
