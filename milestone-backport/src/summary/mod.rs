//! Run summary types and helpers.

mod outcome;
mod plan;
mod run_summary;

pub use outcome::RunOutcome;
pub use plan::RunPlan;
pub use run_summary::RunSummary;
