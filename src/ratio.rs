//! Action-switch ratio aggregation
//!
//! Turns every indexed trial of a noise condition into a ratio, groups the
//! ratios by participant, difficulty and task, and summarizes each
//! (task, difficulty) panel across participants.

use crate::config::{AnalysisConfig, NoSwitchPolicy};
use crate::error::AnalysisError;
use crate::events::TrialEvents;
use crate::loader::{load_trial, TrialIndex};
use crate::outlier::{median, OutlierFilter};
use crate::types::{
    Difficulty, DifficultySummary, Noise, OverallStats, ParticipantStats, Task, TrialKey,
    TrialRatios,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Number of trials recorded per bucket
pub const EXPECTED_TRIALS_PER_BUCKET: usize = 3;

/// Ratios of one noise condition: participant → difficulty → task → trial → ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSwitchRelations {
    pub noise: Noise,
    /// Analyzed participants, in index order
    pub participants: Vec<String>,
    pub relations: BTreeMap<String, BTreeMap<Difficulty, BTreeMap<Task, TrialRatios>>>,
}

impl ActionSwitchRelations {
    /// Ratios of one bucket
    pub fn get(&self, participant: &str, difficulty: Difficulty, task: Task) -> Option<&TrialRatios> {
        self.relations.get(participant)?.get(&difficulty)?.get(&task)
    }
}

/// Ratio of one trial under a no-switch policy
///
/// Returns `Ok(None)` when the trial is excluded.
pub fn trial_ratio(
    events: &TrialEvents,
    policy: NoSwitchPolicy,
    trial: &str,
) -> Result<Option<f64>, AnalysisError> {
    if let Some(ratio) = events.ratio() {
        return Ok(Some(ratio));
    }
    match policy {
        NoSwitchPolicy::Exclude => {
            warn!(trial, actions = events.actions.len(), "trial has no switches, excluded");
            Ok(None)
        }
        NoSwitchPolicy::CountSentinel => Ok(Some(events.actions.len() as f64)),
        NoSwitchPolicy::Fail => Err(AnalysisError::NoSwitches(trial.to_string())),
    }
}

/// Aggregator building [`ActionSwitchRelations`] from a [`TrialIndex`]
pub struct RatioAggregator;

impl RatioAggregator {
    /// Compute every bucket of one noise condition
    pub fn aggregate(
        index: &TrialIndex,
        noise: Noise,
        config: &AnalysisConfig,
    ) -> Result<ActionSwitchRelations, AnalysisError> {
        let participants = config.select_participants(index.participants()).to_vec();
        let mut relations = BTreeMap::new();

        for participant in &participants {
            let mut participant_relations = BTreeMap::new();
            for &difficulty in &config.difficulties {
                let mut difficulty_relations = BTreeMap::new();
                for &task in &config.tasks {
                    let trials = Self::bucket_ratios(
                        index,
                        participant,
                        difficulty,
                        noise,
                        task,
                        config.no_switch_policy,
                    )?;
                    difficulty_relations.insert(task, trials);
                }
                participant_relations.insert(difficulty, difficulty_relations);
            }
            relations.insert(participant.clone(), participant_relations);
        }

        Ok(ActionSwitchRelations {
            noise,
            participants,
            relations,
        })
    }

    /// Ratios of every trial file in one bucket, keyed by trial digit
    pub fn bucket_ratios(
        index: &TrialIndex,
        participant: &str,
        difficulty: Difficulty,
        noise: Noise,
        task: Task,
        policy: NoSwitchPolicy,
    ) -> Result<TrialRatios, AnalysisError> {
        let mut ratios = TrialRatios::new();
        for (trial, path) in index.trials_for(participant, difficulty, noise, task) {
            let key = TrialKey {
                participant: participant.to_string(),
                difficulty,
                noise,
                task,
                trial,
            };
            if let Some(ratio) = Self::trial_file_ratio(path, &key, policy)? {
                ratios.insert(trial.to_string(), ratio);
            }
        }

        if ratios.len() < EXPECTED_TRIALS_PER_BUCKET {
            warn!(
                participant,
                %difficulty,
                %noise,
                %task,
                trials = ratios.len(),
                "fewer trials than expected"
            );
        }
        Ok(ratios)
    }

    fn trial_file_ratio(
        path: &Path,
        key: &TrialKey,
        policy: NoSwitchPolicy,
    ) -> Result<Option<f64>, AnalysisError> {
        let table = load_trial(path)?;
        let events = TrialEvents::extract(&table);
        let ratio = trial_ratio(&events, policy, &key.to_string())?;
        debug!(
            trial = %key,
            rows = table.len(),
            actions = events.actions.len(),
            switches = events.switches.count(),
            ?ratio,
            "trial ratio"
        );
        Ok(ratio)
    }
}

/// Mean, min and max of one participant's trial ratios
pub fn participant_stats(
    participant: &str,
    index: usize,
    ratios: &TrialRatios,
) -> Option<ParticipantStats> {
    if ratios.is_empty() {
        return None;
    }
    let values = ratios.values().copied();
    let sum: f64 = values.clone().sum();
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);

    Some(ParticipantStats {
        participant: participant.to_string(),
        index,
        average: sum / ratios.len() as f64,
        min,
        max,
        trials: ratios.len(),
    })
}

/// Statistics across participants; `None` for an empty slice
pub fn overall_stats(participants: &[&ParticipantStats]) -> Option<OverallStats> {
    if participants.is_empty() {
        return None;
    }
    let n = participants.len() as f64;
    let mean = |f: fn(&ParticipantStats) -> f64| participants.iter().map(|p| f(p)).sum::<f64>() / n;

    Some(OverallStats {
        average: mean(|p| p.average),
        min_average: participants
            .iter()
            .map(|p| p.average)
            .fold(f64::INFINITY, f64::min),
        max_average: participants
            .iter()
            .map(|p| p.average)
            .fold(f64::NEG_INFINITY, f64::max),
        mean_lower_error: mean(ParticipantStats::lower_error),
        mean_upper_error: mean(ParticipantStats::upper_error),
    })
}

/// Summarize one (task, difficulty) panel: per-participant statistics, the
/// median, outliers against `ceiling`, and the overall band of the rest
pub fn summarize(
    relations: &ActionSwitchRelations,
    task: Task,
    difficulty: Difficulty,
    ceiling: f64,
) -> Result<DifficultySummary, AnalysisError> {
    let mut participants = Vec::with_capacity(relations.participants.len());
    for (index, participant) in relations.participants.iter().enumerate() {
        let stats = relations
            .get(participant, difficulty, task)
            .and_then(|ratios| participant_stats(participant, index, ratios))
            .ok_or_else(|| {
                AnalysisError::EmptyBucket(format!(
                    "{participant}/{difficulty}/{}/{task}",
                    relations.noise
                ))
            })?;
        info!(
            participant = %stats.participant,
            %difficulty,
            %task,
            noise = %relations.noise,
            average = stats.average,
            min = stats.min,
            max = stats.max,
            "participant ratio"
        );
        participants.push(stats);
    }

    let averages: Vec<f64> = participants.iter().map(|p| p.average).collect();
    let median = median(&averages);
    let split = OutlierFilter::new(ceiling).split(&averages);
    info!(
        %difficulty,
        %task,
        noise = %relations.noise,
        median = ?median,
        ceiling,
        outliers = ?split.outliers,
        "difficulty summary"
    );

    let kept: Vec<&ParticipantStats> = split.retain(&participants.iter().collect::<Vec<_>>());
    let overall = overall_stats(&kept);
    if overall.is_none() && !participants.is_empty() {
        warn!(%difficulty, %task, "every participant is an outlier");
    }

    Ok(DifficultySummary {
        task,
        difficulty,
        participants,
        median,
        outliers: split.outliers,
        ceiling,
        overall,
    })
}
