pub mod clock;
pub mod commands;
pub mod controller;
pub mod selection;
pub mod state;
pub mod views;

pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::WorkflowController;
pub use selection::{TreatmentSelection, MAX_COMPARED};
pub use state::{parse_start_date, Page, Transition, WorkflowSnapshot, WorkflowState};
pub use views::{MonitorView, PageView, ResultsView, TreatmentOption, TreatmentsView};
