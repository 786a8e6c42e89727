//! Error types for the Moonlander analysis

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, aggregating or rendering trials
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid value '{value}' for column '{column}' in {} (row {row})", path.display())]
    InvalidValue {
        path: PathBuf,
        column: String,
        row: usize,
        value: String,
    },

    #[error("Trial has no task switches, ratio is undefined: {0}")]
    NoSwitches(String),

    #[error("No trial ratios for bucket: {0}")]
    EmptyBucket(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Plot error: {0}")]
    PlotError(String),
}
