//! Event extraction
//!
//! Derives the two index sets of a trial: rows where the participant gave an
//! input ("actions") and rows where the task activity left its starting state
//! ("switches").

use crate::types::{SwitchIndices, TrialTable};
use serde::{Deserialize, Serialize};

/// Action and switch indices of one trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialEvents {
    pub actions: Vec<usize>,
    pub switches: SwitchIndices,
}

impl TrialEvents {
    /// Extract both index sets from a trial table
    pub fn extract(table: &TrialTable) -> Self {
        Self {
            actions: action_indices(table),
            switches: switch_indices(table),
        }
    }

    /// `actions / switches`, or `None` when the trial has no switches
    pub fn ratio(&self) -> Option<f64> {
        match self.switches.count() {
            0 => None,
            n => Some(self.actions.len() as f64 / n as f64),
        }
    }
}

/// Row indices where the activity flag departs from its starting value
///
/// A trial starting active records true→false edges; one starting inactive
/// records false→true edges.
pub fn switch_indices(table: &TrialTable) -> SwitchIndices {
    let Some(first) = table.samples.first() else {
        return SwitchIndices::NoSwitches;
    };
    let initial = first.active_task;

    let indices: Vec<usize> = table
        .samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].active_task == initial && pair[1].active_task != initial)
        .map(|(i, _)| i + 1)
        .collect();

    if indices.is_empty() {
        SwitchIndices::NoSwitches
    } else {
        SwitchIndices::Switches(indices)
    }
}

/// Row indices with a non-missing input, in row order
pub fn action_indices(table: &TrialTable) -> Vec<usize> {
    table
        .samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.current_input.is_some())
        .map(|(i, _)| i)
        .collect()
}
