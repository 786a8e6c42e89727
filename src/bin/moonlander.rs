//! Moonlander CLI - command-line interface for the action-switch analysis
//!
//! Commands:
//! - analyze: Run the full pipeline and write charts and reports (default)
//! - inspect: Print the action and switch indices of a single trial file

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use moonlander_analysis::config::{AVOID_CEILING, COLLECT_CEILING, DEFAULT_DATA_DIR};
use moonlander_analysis::{
    load_trial, run_analysis, AnalysisConfig, AnalysisError, Difficulty, NoSwitchPolicy, Noise,
    SwitchIndices, Task, TrialEvents, ANALYSIS_VERSION,
};

/// Moonlander - action-to-switch ratio analysis of trial logs
#[derive(Parser)]
#[command(name = "moonlander")]
#[command(version = ANALYSIS_VERSION)]
#[command(about = "Compute and plot action-switch ratios from Moonlander trial logs", long_about = None)]
struct Cli {
    /// Log per-trial details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write charts and JSON reports
    Analyze(AnalyzeArgs),

    /// Print action indices, switch indices and ratio of one trial file
    Inspect {
        /// Trial CSV file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Directory holding the trial CSV files
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory the charts and reports are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Noise condition to analyze (repeatable, default: yes and no)
    #[arg(long = "noise")]
    noises: Vec<Noise>,

    /// Difficulty to analyze (repeatable, default: all four)
    #[arg(long = "difficulty")]
    difficulties: Vec<Difficulty>,

    /// Task to analyze (repeatable, default: avoid and collect)
    #[arg(long = "task")]
    tasks: Vec<Task>,

    /// Outlier ceiling and y-axis limit for the avoid task
    #[arg(long, default_value_t = AVOID_CEILING)]
    avoid_ceiling: f64,

    /// Outlier ceiling and y-axis limit for the collect task
    #[arg(long, default_value_t = COLLECT_CEILING)]
    collect_ceiling: f64,

    /// How trials without any task switch are handled
    #[arg(long, value_enum, default_value = "exclude")]
    no_switch_policy: PolicyArg,

    /// Only analyze the first N participants
    #[arg(long)]
    max_participants: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Leave the trial out of its bucket
    Exclude,
    /// Count the missing switch as one switch
    CountSentinel,
    /// Abort the run
    Fail,
}

impl From<PolicyArg> for NoSwitchPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Exclude => NoSwitchPolicy::Exclude,
            PolicyArg::CountSentinel => NoSwitchPolicy::CountSentinel,
            PolicyArg::Fail => NoSwitchPolicy::Fail,
        }
    }
}

impl AnalyzeArgs {
    fn into_config(self) -> AnalysisConfig {
        let defaults = AnalysisConfig::default();
        AnalysisConfig {
            data_dir: self.data_dir,
            output_dir: self.output_dir,
            difficulties: or_default(self.difficulties, defaults.difficulties),
            tasks: or_default(self.tasks, defaults.tasks),
            noises: or_default(self.noises, defaults.noises),
            avoid_ceiling: self.avoid_ceiling,
            collect_ceiling: self.collect_ceiling,
            no_switch_policy: self.no_switch_policy.into(),
            max_participants: self.max_participants,
        }
    }
}

fn or_default<T>(values: Vec<T>, default: Vec<T>) -> Vec<T> {
    if values.is_empty() {
        default
    } else {
        values
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stdout))
        .init();
}

fn run(cli: Cli) -> Result<(), MoonlanderCliError> {
    match cli.command {
        None => cmd_analyze(AnalysisConfig::default()),
        Some(Commands::Analyze(args)) => cmd_analyze(args.into_config()),
        Some(Commands::Inspect { file, json }) => cmd_inspect(&file, json),
    }
}

fn cmd_analyze(config: AnalysisConfig) -> Result<(), MoonlanderCliError> {
    let outcome = run_analysis(&config)?;
    if outcome.participants == 0 {
        return Err(MoonlanderCliError::NoParticipants(config.data_dir));
    }

    tracing::info!(
        participants = outcome.participants,
        charts = outcome.charts.len(),
        reports = outcome.reports.len(),
        "analysis complete"
    );
    Ok(())
}

fn cmd_inspect(file: &PathBuf, json: bool) -> Result<(), MoonlanderCliError> {
    let table = load_trial(file)?;
    let events = TrialEvents::extract(&table);

    let report = InspectReport {
        file: file.display().to_string(),
        rows: table.len(),
        ratio: events.ratio(),
        actions: events.actions,
        switches: events.switches,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trial Report");
        println!("============");
        println!("File:     {}", report.file);
        println!("Rows:     {}", report.rows);
        println!("Actions:  {} {:?}", report.actions.len(), report.actions);
        match &report.switches {
            SwitchIndices::NoSwitches => println!("Switches: none"),
            SwitchIndices::Switches(indices) => {
                println!("Switches: {} {:?}", indices.len(), indices)
            }
        }
        match report.ratio {
            Some(ratio) => println!("Ratio:    {ratio:.3}"),
            None => println!("Ratio:    undefined (no switches)"),
        }
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum MoonlanderCliError {
    Analysis(AnalysisError),
    Json(serde_json::Error),
    NoParticipants(PathBuf),
}

impl From<AnalysisError> for MoonlanderCliError {
    fn from(e: AnalysisError) -> Self {
        MoonlanderCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for MoonlanderCliError {
    fn from(e: serde_json::Error) -> Self {
        MoonlanderCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MoonlanderCliError> for CliError {
    fn from(e: MoonlanderCliError) -> Self {
        match e {
            MoonlanderCliError::Analysis(e) => {
                let (code, hint) = match &e {
                    AnalysisError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                    AnalysisError::Csv(_)
                    | AnalysisError::MissingColumn { .. }
                    | AnalysisError::InvalidValue { .. } => (
                        "PARSE_ERROR",
                        "Trial files need 'active_task' and 'current_input' columns",
                    ),
                    AnalysisError::NoSwitches(_) => (
                        "NO_SWITCHES",
                        "Use --no-switch-policy exclude to skip such trials",
                    ),
                    AnalysisError::EmptyBucket(_) => (
                        "EMPTY_BUCKET",
                        "Every participant needs trial files for each analyzed condition",
                    ),
                    AnalysisError::JsonError(_) => ("JSON_ERROR", "Check the output directory"),
                    AnalysisError::PlotError(_) => (
                        "PLOT_ERROR",
                        "Check the output directory and that a system font is installed",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MoonlanderCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            MoonlanderCliError::NoParticipants(dir) => CliError {
                code: "NO_PARTICIPANTS".to_string(),
                message: format!("No *_block_trials.csv files in {}", dir.display()),
                hint: Some("Point --data-dir at the trial log directory".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    file: String,
    rows: usize,
    actions: Vec<usize>,
    switches: SwitchIndices,
    ratio: Option<f64>,
}
