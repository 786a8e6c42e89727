//! Analysis configuration
//!
//! The defaults are the literal constants the analysis was designed around:
//! every difficulty and noise condition, both tasks, and a ceiling of 8 for
//! `avoid` and 20 for `collect`.

use crate::types::{Difficulty, Noise, Task};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory holding the trial CSV files
pub const DEFAULT_DATA_DIR: &str = "data";

/// Ratio ceiling for the avoid task
pub const AVOID_CEILING: f64 = 8.0;

/// Ratio ceiling for the collect task
pub const COLLECT_CEILING: f64 = 20.0;

/// How a trial without any task switch contributes to its bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSwitchPolicy {
    /// Leave the trial out of the bucket and log a warning
    #[default]
    Exclude,
    /// Count the missing switch as one switch (`actions / 1`)
    CountSentinel,
    /// Abort the run
    Fail,
}

/// Inputs, outputs and thresholds of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub difficulties: Vec<Difficulty>,
    pub tasks: Vec<Task>,
    pub noises: Vec<Noise>,
    pub avoid_ceiling: f64,
    pub collect_ceiling: f64,
    pub no_switch_policy: NoSwitchPolicy,
    /// Only analyze the first N participants (sorted by ID)
    pub max_participants: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from("."),
            difficulties: Difficulty::ALL.to_vec(),
            tasks: Task::ALL.to_vec(),
            noises: Noise::ALL.to_vec(),
            avoid_ceiling: AVOID_CEILING,
            collect_ceiling: COLLECT_CEILING,
            no_switch_policy: NoSwitchPolicy::default(),
            max_participants: None,
        }
    }
}

impl AnalysisConfig {
    /// Outlier ceiling (and y-axis limit) for a task
    pub fn ceiling(&self, task: Task) -> f64 {
        match task {
            Task::Avoid => self.avoid_ceiling,
            Task::Collect => self.collect_ceiling,
        }
    }

    /// Apply `max_participants` to a sorted participant list
    pub fn select_participants<'a>(&self, participants: &'a [String]) -> &'a [String] {
        match self.max_participants {
            Some(n) if n < participants.len() => &participants[..n],
            _ => participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceilings() {
        let config = AnalysisConfig::default();
        assert_eq!(config.ceiling(Task::Avoid), 8.0);
        assert_eq!(config.ceiling(Task::Collect), 20.0);
        assert_eq!(config.difficulties.len(), 4);
        assert_eq!(config.no_switch_policy, NoSwitchPolicy::Exclude);
    }

    #[test]
    fn test_select_participants() {
        let participants: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut config = AnalysisConfig::default();
        assert_eq!(config.select_participants(&participants).len(), 4);

        config.max_participants = Some(3);
        assert_eq!(config.select_participants(&participants), &participants[..3]);

        config.max_participants = Some(10);
        assert_eq!(config.select_participants(&participants).len(), 4);
    }
}
