//! Trial data types
//!
//! This module defines the keys, samples and statistics that flow through the
//! action-switch analysis pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Trial configuration difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    EasyEasy,
    EasyHard,
    HardEasy,
    HardHard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::EasyEasy,
        Difficulty::EasyHard,
        Difficulty::HardEasy,
        Difficulty::HardHard,
    ];

    /// Tag used in trial file names
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::EasyEasy => "easy_easy",
            Difficulty::EasyHard => "easy_hard",
            Difficulty::HardEasy => "hard_easy",
            Difficulty::HardHard => "hard_hard",
        }
    }
}

/// Whether input noise was enabled for a batch of trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Noise {
    Yes,
    No,
}

impl Noise {
    pub const ALL: [Noise; 2] = [Noise::Yes, Noise::No];

    pub fn as_str(self) -> &'static str {
        match self {
            Noise::Yes => "yes",
            Noise::No => "no",
        }
    }
}

/// Task performed during a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Avoid,
    Collect,
}

impl Task {
    pub const ALL: [Task; 2] = [Task::Avoid, Task::Collect];

    pub fn as_str(self) -> &'static str {
        match self {
            Task::Avoid => "avoid",
            Task::Collect => "collect",
        }
    }
}

macro_rules! impl_tag {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| format!("unknown {} '{}'", $what, s))
            }
        }
    };
}

impl_tag!(Difficulty, "difficulty");
impl_tag!(Noise, "noise condition");
impl_tag!(Task, "task");

/// Identifies one trial file: (participant, difficulty, noise, task, trial number)
///
/// Field order matters: the derived ordering groups all trials of a bucket
/// together, sorted by trial number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrialKey {
    pub participant: String,
    pub difficulty: Difficulty,
    pub noise: Noise,
    pub task: Task,
    pub trial: u8,
}

impl TrialKey {
    /// File name this key is stored under
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}.csv",
            self.participant, self.difficulty, self.noise, self.task, self.trial
        )
    }
}

impl fmt::Display for TrialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}#{}",
            self.participant, self.difficulty, self.noise, self.task, self.trial
        )
    }
}

/// One time-ordered row of a trial log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSample {
    /// Whether the task was active at this sample
    pub active_task: bool,
    /// User input at this sample, `None` when no input was given
    pub current_input: Option<String>,
}

/// Row-indexed samples of one trial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialTable {
    pub samples: Vec<TrialSample>,
}

impl TrialTable {
    pub fn new(samples: Vec<TrialSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Row indices of task switches within a trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "indices")]
pub enum SwitchIndices {
    /// The activity flag never left its starting value
    NoSwitches,
    /// Non-empty, ascending row indices
    Switches(Vec<usize>),
}

impl SwitchIndices {
    /// Number of real switches (zero for `NoSwitches`)
    pub fn count(&self) -> usize {
        match self {
            SwitchIndices::NoSwitches => 0,
            SwitchIndices::Switches(indices) => indices.len(),
        }
    }
}

/// Per-trial ratios of one (participant, difficulty, task) bucket, keyed by trial digit
pub type TrialRatios = BTreeMap<String, f64>;

/// Ratio statistics of one participant within a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub participant: String,
    /// Position in the analyzed participant list
    pub index: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub trials: usize,
}

impl ParticipantStats {
    /// Distance from the average down to the minimum
    pub fn lower_error(&self) -> f64 {
        self.average - self.min
    }

    /// Distance from the average up to the maximum
    pub fn upper_error(&self) -> f64 {
        self.max - self.average
    }
}

/// Statistics across the non-outlier participants of one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    /// Mean of participant averages
    pub average: f64,
    /// Smallest participant average
    pub min_average: f64,
    /// Largest participant average
    pub max_average: f64,
    /// Mean of (average - min) over participants
    pub mean_lower_error: f64,
    /// Mean of (max - average) over participants
    pub mean_upper_error: f64,
}

impl OverallStats {
    pub fn lower_band(&self) -> f64 {
        self.average - self.mean_lower_error
    }

    pub fn upper_band(&self) -> f64 {
        self.average + self.mean_upper_error
    }
}

/// Everything known about one (task, difficulty) panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultySummary {
    pub task: Task,
    pub difficulty: Difficulty,
    /// Every participant, outliers included
    pub participants: Vec<ParticipantStats>,
    /// Median of all participant averages (diagnostic only)
    pub median: Option<f64>,
    /// Positions in `participants` whose average exceeded the ceiling
    pub outliers: Vec<usize>,
    pub ceiling: f64,
    /// `None` when every participant is an outlier
    pub overall: Option<OverallStats>,
}

impl DifficultySummary {
    /// Participants that survived the outlier filter
    pub fn kept(&self) -> impl Iterator<Item = &ParticipantStats> {
        self.participants
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.outliers.contains(i))
            .map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_str() {
        for d in Difficulty::ALL {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert_eq!("no".parse::<Noise>().unwrap(), Noise::No);
        assert_eq!("collect".parse::<Task>().unwrap(), Task::Collect);
        assert!("medium".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_trial_key_file_name() {
        let key = TrialKey {
            participant: "p01".to_string(),
            difficulty: Difficulty::HardEasy,
            noise: Noise::Yes,
            task: Task::Avoid,
            trial: 2,
        };
        assert_eq!(key.file_name(), "p01_hard_easy_yes_avoid_2.csv");
    }

    #[test]
    fn test_trial_keys_order_by_trial_within_bucket() {
        let key = |trial| TrialKey {
            participant: "p".to_string(),
            difficulty: Difficulty::EasyEasy,
            noise: Noise::No,
            task: Task::Collect,
            trial,
        };
        let mut keys = vec![key(2), key(0), key(1)];
        keys.sort();
        let trials: Vec<u8> = keys.iter().map(|k| k.trial).collect();
        assert_eq!(trials, vec![0, 1, 2]);
    }

    #[test]
    fn test_switch_indices_count() {
        assert_eq!(SwitchIndices::NoSwitches.count(), 0);
        assert_eq!(SwitchIndices::Switches(vec![3, 9]).count(), 2);
    }

    #[test]
    fn test_switch_indices_serialization() {
        let json = serde_json::to_string(&SwitchIndices::Switches(vec![4])).unwrap();
        assert_eq!(json, r#"{"kind":"switches","indices":[4]}"#);
        let json = serde_json::to_string(&SwitchIndices::NoSwitches).unwrap();
        assert_eq!(json, r#"{"kind":"no_switches"}"#);
    }
}
