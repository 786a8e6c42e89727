//! Moonlander Analysis - action-to-switch ratios from Moonlander trial logs
//!
//! Trials are read from per-trial CSV logs and flow through a deterministic
//! pipeline: trial loading → event extraction → ratio aggregation → outlier
//! filtering → chart rendering and JSON reporting.
//!
//! ## Modules
//!
//! - **Loader**: index the data directory and parse trial CSV files
//! - **Events**: action and switch indices of a trial
//! - **Ratio**: per-trial ratios and per-participant/per-difficulty statistics
//! - **Outlier**: ceiling-based participant filtering
//! - **Plot / Report**: PNG comparison charts and JSON summaries

pub mod config;
pub mod error;
pub mod events;
pub mod loader;
pub mod outlier;
pub mod pipeline;
pub mod plot;
pub mod ratio;
pub mod report;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{AnalysisConfig, NoSwitchPolicy};
pub use error::AnalysisError;
pub use events::{action_indices, switch_indices, TrialEvents};
pub use loader::{load_trial, TrialIndex};
pub use pipeline::{analyze_noise, run_analysis, AnalysisOutcome, NoiseAnalysis};
pub use ratio::{ActionSwitchRelations, RatioAggregator};
pub use types::{Difficulty, Noise, SwitchIndices, Task, TrialKey, TrialTable};

/// Crate version embedded in every report
pub const ANALYSIS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "moonlander-analysis";
