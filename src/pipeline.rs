//! Analysis pipeline orchestration
//!
//! Runs the stages for every configured noise condition:
//! index → aggregate → summarize/filter → chart → report.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::loader::TrialIndex;
use crate::plot::{ChartModel, PlotRenderer};
use crate::ratio::{summarize, ActionSwitchRelations, RatioAggregator};
use crate::report::ReportEncoder;
use crate::types::{DifficultySummary, Noise};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Aggregated relations and panel summaries of one noise condition
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseAnalysis {
    pub relations: ActionSwitchRelations,
    /// One entry per (task, difficulty), tasks outermost, in configured order
    pub summaries: Vec<DifficultySummary>,
}

impl NoiseAnalysis {
    /// Chart models, one per configured task
    pub fn charts(&self, config: &AnalysisConfig) -> Vec<ChartModel> {
        config
            .tasks
            .iter()
            .map(|&task| ChartModel::build(task, self.relations.noise, &self.summaries))
            .collect()
    }
}

/// Files written by a full run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutcome {
    pub participants: usize,
    pub charts: Vec<PathBuf>,
    pub reports: Vec<PathBuf>,
}

/// Aggregate, summarize and filter one noise condition (no output files)
pub fn analyze_noise(
    index: &TrialIndex,
    noise: Noise,
    config: &AnalysisConfig,
) -> Result<NoiseAnalysis, AnalysisError> {
    // Stage 1: Per-trial ratios grouped by participant, difficulty and task
    let relations = RatioAggregator::aggregate(index, noise, config)?;

    // Stage 2: Per-panel statistics with outliers removed from the bands
    let mut summaries = Vec::with_capacity(config.tasks.len() * config.difficulties.len());
    for &task in &config.tasks {
        for &difficulty in &config.difficulties {
            summaries.push(summarize(&relations, task, difficulty, config.ceiling(task))?);
        }
    }

    Ok(NoiseAnalysis {
        relations,
        summaries,
    })
}

/// Run the whole analysis: charts and reports for every noise condition
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisOutcome, AnalysisError> {
    let index = TrialIndex::scan(&config.data_dir)?;
    let participants = config.select_participants(index.participants()).len();
    info!(
        data_dir = %config.data_dir.display(),
        participants = index.participants().len(),
        analyzed = participants,
        trial_files = index.trial_count(),
        "indexed data directory"
    );
    let mut outcome = AnalysisOutcome {
        participants,
        ..AnalysisOutcome::default()
    };
    if participants == 0 {
        warn!("no participants found, nothing to plot");
        return Ok(outcome);
    }

    fs::create_dir_all(&config.output_dir)?;
    let renderer = PlotRenderer::default();
    let encoder = ReportEncoder::new();

    for &noise in &config.noises {
        let analysis = analyze_noise(&index, noise, config)?;

        for chart in analysis.charts(config) {
            let path = renderer.render(&chart, &config.output_dir)?;
            info!(path = %path.display(), "chart written");
            outcome.charts.push(path);
        }

        let path = encoder.write(
            &analysis.relations,
            &analysis.summaries,
            config.no_switch_policy,
            &config.output_dir,
        )?;
        info!(path = %path.display(), "report written");
        outcome.reports.push(path);
    }

    Ok(outcome)
}
