//! Mindtrack CLI
//!
//! Commands:
//! - train: fit per-user baselines from a history file
//! - detect: score a new entry against a user's baseline
//! - feedback: append a reviewer verdict to the feedback log

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mindtrack::{
    pipeline, AnomalyScorer, DetectorConfig, FeedbackLabel, FeedbackLog, NewEntry,
    MINDTRACK_VERSION,
};

/// Mindtrack - per-user behavioral anomaly detection
#[derive(Parser)]
#[command(name = "mindtrack")]
#[command(version = MINDTRACK_VERSION)]
#[command(about = "Train and score per-user digital-wellbeing baselines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit per-user baselines from a history file (.csv or .json)
    Train {
        /// Input history file
        #[arg(short, long)]
        input: PathBuf,

        /// Column holding user ids; one bundle is trained per distinct value
        #[arg(long)]
        user_col: Option<String>,

        /// User id for single-user training (when no user column applies)
        #[arg(long, default_value = "user123")]
        user_id: String,

        /// Directory for bundle artifacts
        #[arg(long, default_value = "mindtrack_models")]
        models_dir: PathBuf,

        /// Expected outlier fraction in (0, 1)
        #[arg(long, default_value = "0.05")]
        contamination: f64,
    },

    /// Score a new entry (JSON, flat or under "feature_values") for a user
    Detect {
        /// Entry JSON file (use - for stdin)
        #[arg(short, long)]
        entry: PathBuf,

        /// User whose baseline to score against
        #[arg(long)]
        user_id: String,

        /// Directory holding bundle artifacts
        #[arg(long, default_value = "mindtrack_models")]
        models_dir: PathBuf,
    },

    /// Append a reviewer verdict for a scored entry to the feedback log
    Feedback {
        /// Detection result JSON file (as printed by `detect`; - for stdin)
        #[arg(short, long)]
        result: PathBuf,

        /// Reviewer verdict
        #[arg(long, value_enum)]
        label: LabelArg,

        /// Feedback log file
        #[arg(long, default_value = "mindtrack_feedback.json")]
        log: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LabelArg {
    TrueAnomaly,
    FalsePositive,
}

impl From<LabelArg> for FeedbackLabel {
    fn from(label: LabelArg) -> Self {
        match label {
            LabelArg::TrueAnomaly => FeedbackLabel::TrueAnomaly,
            LabelArg::FalsePositive => FeedbackLabel::FalsePositive,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Train {
            input,
            user_col,
            user_id,
            models_dir,
            contamination,
        } => {
            let config = DetectorConfig {
                models_dir,
                contamination,
                ..DetectorConfig::default()
            };
            let outcomes =
                pipeline::train_from_file(&input, user_col.as_deref(), &user_id, &config)?;

            let mut failures = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(path) => println!(
                        "trained {} ({} rows) -> {}",
                        outcome.user_id,
                        outcome.n_rows,
                        path.display()
                    ),
                    Err(err) => {
                        failures += 1;
                        eprintln!("failed {}: {}", outcome.user_id, err);
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} of {} baselines failed", outcomes.len()).into());
            }
            Ok(())
        }

        Commands::Detect {
            entry,
            user_id,
            models_dir,
        } => {
            let raw = read_input(&entry)?;
            let entry: NewEntry = serde_json::from_str(&raw)?;
            let config = DetectorConfig::with_models_dir(models_dir);
            let result = AnomalyScorer::new(config).detect(&entry, &user_id)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        Commands::Feedback { result, label, log } => {
            let raw = read_input(&result)?;
            let result = serde_json::from_str(&raw)?;
            FeedbackLog::new(&log).append(result, label.into())?;
            println!("recorded feedback -> {}", log.display());
            Ok(())
        }
    }
}

fn read_input(path: &PathBuf) -> Result<String, io::Error> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}
