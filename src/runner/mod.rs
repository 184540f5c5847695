// Declare the report submodule (outcomes and the JSON summary)
mod report;

// Declare the runner submodule (planning and the sequential job loop)
mod runner;

// Declare the display submodule (terminal tables)
pub mod display;

pub use report::{BatchReport, JobOutcome, JobStatus};
pub use runner::{BatchPlan, BatchRunner, PlannedJob};
