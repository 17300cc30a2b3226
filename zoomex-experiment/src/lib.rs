pub mod config;
pub mod driver;
pub mod state;

pub use config::ExperimentConfig;
pub use driver::{AbortReason, TrialOutcome, run_batch, run_trial, select_cell};
pub use state::TrialSimulation;
