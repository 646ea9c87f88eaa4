pub mod calculator;
pub mod store;

pub use calculator::{compute_next_application, parse_frequency_days, DEFAULT_FREQUENCY_DAYS};
pub use store::TreatmentScheduleStore;
