//! JSON summary report
//!
//! Encodes the relations and panel statistics of one noise condition as a
//! JSON document written next to the charts.

use crate::config::NoSwitchPolicy;
use crate::error::AnalysisError;
use crate::ratio::ActionSwitchRelations;
use crate::types::{DifficultySummary, Noise};
use crate::{ANALYSIS_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Output file name of the report for one noise condition
pub fn report_file_name(noise: Noise) -> String {
    format!("relation_summary_{noise}.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub run_id: String,
}

/// Serialized form of one noise condition's analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub noise: Noise,
    pub no_switch_policy: NoSwitchPolicy,
    pub relations: ActionSwitchRelations,
    pub summaries: Vec<DifficultySummary>,
}

/// Report encoder; one instance per run so every report shares the run id
pub struct ReportEncoder {
    run_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a fresh run id
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific run id
    pub fn with_run_id(run_id: String) -> Self {
        Self { run_id }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn encode(
        &self,
        relations: &ActionSwitchRelations,
        summaries: &[DifficultySummary],
        policy: NoSwitchPolicy,
    ) -> RelationReport {
        RelationReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ANALYSIS_VERSION.to_string(),
                run_id: self.run_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            noise: relations.noise,
            no_switch_policy: policy,
            relations: relations.clone(),
            summaries: summaries.to_vec(),
        }
    }

    pub fn encode_to_json(
        &self,
        relations: &ActionSwitchRelations,
        summaries: &[DifficultySummary],
        policy: NoSwitchPolicy,
    ) -> Result<String, AnalysisError> {
        let report = self.encode(relations, summaries, policy);
        serde_json::to_string_pretty(&report).map_err(AnalysisError::JsonError)
    }

    /// Write the report into `output_dir` and return its path
    pub fn write(
        &self,
        relations: &ActionSwitchRelations,
        summaries: &[DifficultySummary],
        policy: NoSwitchPolicy,
        output_dir: &Path,
    ) -> Result<PathBuf, AnalysisError> {
        let path = output_dir.join(report_file_name(relations.noise));
        fs::write(&path, self.encode_to_json(relations, summaries, policy)?)?;
        Ok(path)
    }
}
