//! Trial loader
//!
//! Indexes the data directory once and reads trial CSV logs into
//! [`TrialTable`]s.
//!
//! Two file families are recognized:
//! - `<participant>_block_trials.csv`: one per participant, only used to
//!   enumerate participant IDs
//! - `<participant>_<difficulty>_<noise>_<task>_<n>.csv`: one trial, `n` in 0..=2

use crate::error::AnalysisError;
use crate::types::{Difficulty, Noise, Task, TrialKey, TrialSample, TrialTable};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of per-participant block summary files
pub const BLOCK_TRIALS_SUFFIX: &str = "_block_trials.csv";

/// Highest trial number recorded per bucket
pub const MAX_TRIAL_NUMBER: u8 = 2;

/// Column holding the task-activity flag
pub const ACTIVE_TASK_COLUMN: &str = "active_task";

/// Column holding the (nullable) user input
pub const CURRENT_INPUT_COLUMN: &str = "current_input";

/// Cell values treated as a missing input, matched exactly (no trimming)
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Extract the participant ID from a block summary file name
pub fn parse_block_file_name(name: &str) -> Option<String> {
    let participant = name.strip_suffix(BLOCK_TRIALS_SUFFIX)?;
    if participant.is_empty() {
        return None;
    }
    Some(participant.to_string())
}

/// Parse `<participant>_<difficulty>_<noise>_<task>_<n>.csv` into a [`TrialKey`]
///
/// The name is split from the right so participant IDs may contain underscores.
pub fn parse_trial_file_name(name: &str) -> Option<TrialKey> {
    let stem = name.strip_suffix(".csv")?;
    let mut parts = stem.rsplitn(6, '_');

    let trial = parts.next()?;
    let task = parts.next()?.parse::<Task>().ok()?;
    let noise = parts.next()?.parse::<Noise>().ok()?;
    let difficulty_second = parts.next()?;
    let difficulty_first = parts.next()?;
    let participant = parts.next()?;

    if participant.is_empty() || trial.len() != 1 {
        return None;
    }
    let trial = trial.parse::<u8>().ok()?;
    if trial > MAX_TRIAL_NUMBER {
        return None;
    }
    let difficulty = format!("{difficulty_first}_{difficulty_second}")
        .parse::<Difficulty>()
        .ok()?;

    Some(TrialKey {
        participant: participant.to_string(),
        difficulty,
        noise,
        task,
        trial,
    })
}

/// Typed index over the trial files of a data directory
#[derive(Debug, Clone, Default)]
pub struct TrialIndex {
    participants: Vec<String>,
    trials: BTreeMap<TrialKey, PathBuf>,
}

impl TrialIndex {
    /// Build the index from the directory listing of `data_dir`
    pub fn scan(data_dir: &Path) -> Result<Self, AnalysisError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(Self::from_file_names(data_dir, names))
    }

    /// Build the index from an explicit list of file names inside `data_dir`
    pub fn from_file_names<I, S>(data_dir: &Path, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut participants = BTreeSet::new();
        let mut trials = BTreeMap::new();

        for name in names {
            let name = name.as_ref();
            if let Some(participant) = parse_block_file_name(name) {
                participants.insert(participant);
            } else if let Some(key) = parse_trial_file_name(name) {
                trials.insert(key, data_dir.join(name));
            } else {
                debug!(file = name, "skipping unrecognized file");
            }
        }

        Self {
            participants: participants.into_iter().collect(),
            trials,
        }
    }

    /// Participant IDs, sorted
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Total number of indexed trial files
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Trial files of one bucket as (trial number, path), sorted by trial number
    pub fn trials_for(
        &self,
        participant: &str,
        difficulty: Difficulty,
        noise: Noise,
        task: Task,
    ) -> impl Iterator<Item = (u8, &Path)> {
        let key = |trial| TrialKey {
            participant: participant.to_string(),
            difficulty,
            noise,
            task,
            trial,
        };
        self.trials
            .range(key(0)..=key(MAX_TRIAL_NUMBER))
            .map(|(k, path)| (k.trial, path.as_path()))
    }
}

/// Load one trial CSV file
pub fn load_trial(path: &Path) -> Result<TrialTable, AnalysisError> {
    let file = fs::File::open(path)?;
    read_trial(file, path)
}

/// Read trial rows from any CSV source; `source` is only used in error messages
pub fn read_trial<R: Read>(reader: R, source: &Path) -> Result<TrialTable, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                path: source.to_path_buf(),
                column: name.to_string(),
            })
    };
    let active_idx = column(ACTIVE_TASK_COLUMN)?;
    let input_idx = column(CURRENT_INPUT_COLUMN)?;

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let active_raw = record.get(active_idx).unwrap_or_default();
        let active_task =
            parse_flag(active_raw).ok_or_else(|| AnalysisError::InvalidValue {
                path: source.to_path_buf(),
                column: ACTIVE_TASK_COLUMN.to_string(),
                row,
                value: active_raw.to_string(),
            })?;
        let current_input = record
            .get(input_idx)
            .filter(|v| !NA_MARKERS.contains(v))
            .map(str::to_string);

        samples.push(TrialSample {
            active_task,
            current_input,
        });
    }

    Ok(TrialTable::new(samples))
}

/// Parse a boolean cell as written by the experiment logger
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Some(true),
        "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDataDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_trial_file_name() {
        let key = parse_trial_file_name("p07_easy_hard_no_collect_1.csv").unwrap();
        assert_eq!(
            key,
            TrialKey {
                participant: "p07".to_string(),
                difficulty: Difficulty::EasyHard,
                noise: Noise::No,
                task: Task::Collect,
                trial: 1,
            }
        );
    }

    #[test]
    fn test_parse_trial_file_name_with_underscored_participant() {
        let key = parse_trial_file_name("lab_b_12_hard_hard_yes_avoid_0.csv").unwrap();
        assert_eq!(key.participant, "lab_b_12");
        assert_eq!(key.difficulty, Difficulty::HardHard);
        assert_eq!(key.trial, 0);
    }

    #[test]
    fn test_parse_trial_file_name_rejects_non_trials() {
        // trial digit out of range
        assert!(parse_trial_file_name("p1_easy_easy_no_avoid_3.csv").is_none());
        // two-digit trial
        assert!(parse_trial_file_name("p1_easy_easy_no_avoid_10.csv").is_none());
        // unknown task / noise / difficulty
        assert!(parse_trial_file_name("p1_easy_easy_no_dodge_0.csv").is_none());
        assert!(parse_trial_file_name("p1_easy_easy_maybe_avoid_0.csv").is_none());
        assert!(parse_trial_file_name("p1_mid_easy_no_avoid_0.csv").is_none());
        // missing participant
        assert!(parse_trial_file_name("easy_easy_no_avoid_0.csv").is_none());
        // wrong extension and block files
        assert!(parse_trial_file_name("p1_easy_easy_no_avoid_0.txt").is_none());
        assert!(parse_trial_file_name("p1_block_trials.csv").is_none());
    }

    #[test]
    fn test_parse_block_file_name() {
        assert_eq!(parse_block_file_name("p01_block_trials.csv").as_deref(), Some("p01"));
        assert_eq!(parse_block_file_name("_block_trials.csv"), None);
        assert_eq!(parse_block_file_name("p01_easy_easy_no_avoid_0.csv"), None);
    }

    #[test]
    fn test_index_from_file_names() {
        let names = [
            "p2_block_trials.csv",
            "p1_block_trials.csv",
            "p1_easy_easy_no_avoid_2.csv",
            "p1_easy_easy_no_avoid_0.csv",
            "p1_easy_easy_no_avoid_1.csv",
            "p1_easy_easy_yes_avoid_0.csv",
            "p1_easy_easy_no_collect_0.csv",
            "p2_hard_easy_no_avoid_0.csv",
            "notes.txt",
        ];
        let index = TrialIndex::from_file_names(Path::new("data"), names);

        assert_eq!(index.participants(), &["p1".to_string(), "p2".to_string()]);
        assert_eq!(index.trial_count(), 6);

        let bucket: Vec<(u8, &Path)> = index
            .trials_for("p1", Difficulty::EasyEasy, Noise::No, Task::Avoid)
            .collect();
        assert_eq!(
            bucket,
            vec![
                (0, Path::new("data/p1_easy_easy_no_avoid_0.csv")),
                (1, Path::new("data/p1_easy_easy_no_avoid_1.csv")),
                (2, Path::new("data/p1_easy_easy_no_avoid_2.csv")),
            ]
        );

        assert_eq!(
            index
                .trials_for("p2", Difficulty::EasyEasy, Noise::No, Task::Avoid)
                .count(),
            0
        );
    }

    #[test]
    fn test_index_does_not_mix_prefix_participants() {
        let names = ["p1_easy_easy_no_avoid_0.csv", "p11_easy_easy_no_avoid_0.csv"];
        let index = TrialIndex::from_file_names(Path::new("data"), names);
        let bucket: Vec<u8> = index
            .trials_for("p1", Difficulty::EasyEasy, Noise::No, Task::Avoid)
            .map(|(trial, _)| trial)
            .collect();
        assert_eq!(bucket, vec![0]);
    }

    #[test]
    fn test_read_trial() {
        let csv = "\
time,active_task,current_input
0.0,True,
0.1,True,up
0.2,False,nan
0.3,False,left
0.4,True,NaN
";
        let table = read_trial(csv.as_bytes(), Path::new("inline.csv")).unwrap();
        let active: Vec<bool> = table.samples.iter().map(|s| s.active_task).collect();
        assert_eq!(active, vec![true, true, false, false, true]);
        let inputs: Vec<Option<&str>> = table
            .samples
            .iter()
            .map(|s| s.current_input.as_deref())
            .collect();
        assert_eq!(inputs, vec![None, Some("up"), None, Some("left"), None]);
    }

    #[test]
    fn test_read_trial_missing_input_markers() {
        let csv = "\
active_task,current_input
True,n/a
True,#N/A
True,#NA
True,-nan
True,-NaN
True,1.#QNAN
True,null
True,\x20
True,0
";
        let table = read_trial(csv.as_bytes(), Path::new("inline.csv")).unwrap();
        let inputs: Vec<Option<&str>> = table
            .samples
            .iter()
            .map(|s| s.current_input.as_deref())
            .collect();
        assert_eq!(
            inputs,
            vec![None, None, None, None, None, None, None, Some(" "), Some("0")]
        );
    }

    #[test]
    fn test_read_trial_missing_column() {
        let csv = "time,active_task\n0.0,True\n";
        let err = read_trial(csv.as_bytes(), Path::new("inline.csv")).unwrap_err();
        match err {
            AnalysisError::MissingColumn { column, .. } => assert_eq!(column, "current_input"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_trial_invalid_flag() {
        let csv = "active_task,current_input\nTrue,\nsometimes,\n";
        let err = read_trial(csv.as_bytes(), Path::new("inline.csv")).unwrap_err();
        match err {
            AnalysisError::InvalidValue { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "sometimes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_trial_ragged_rows_fail() {
        let csv = "active_task,current_input\nTrue,up,extra\n";
        let result = read_trial(csv.as_bytes(), Path::new("inline.csv"));
        assert!(matches!(result, Err(AnalysisError::Csv(_))));
    }

    #[test]
    fn test_scan_and_load_from_disk() {
        let dir = TempDataDir::new();
        dir.write("p1_block_trials.csv", "block\n0\n");
        dir.write(
            "p1_hard_hard_yes_collect_0.csv",
            "active_task,current_input\nfalse,\ntrue,a\n",
        );
        dir.write("README.md", "not data");

        let index = TrialIndex::scan(dir.path()).unwrap();
        assert_eq!(index.participants(), &["p1".to_string()]);

        let (trial, path) = index
            .trials_for("p1", Difficulty::HardHard, Noise::Yes, Task::Collect)
            .next()
            .unwrap();
        assert_eq!(trial, 0);

        let table = load_trial(path).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = TrialIndex::scan(Path::new("/definitely/not/a/moonlander/dir"));
        assert!(matches!(result, Err(AnalysisError::Io(_))));
    }
}
