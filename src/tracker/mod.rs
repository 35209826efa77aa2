pub mod controller;
pub mod error;
mod loop_worker;
pub mod state;

pub use controller::{StepTracker, TrackerOptions, DEFAULT_REFRESH_INTERVAL};
pub use error::TrackerError;
pub use state::{Diagnostic, DiagnosticKind, RefreshKind, RefreshOutcome, TrackerState};
