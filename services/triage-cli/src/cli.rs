use crate::assess::{run_assessment, AssessArgs};
use crate::score::{run_score, ScoreArgs};
use clap::{Parser, Subcommand};
use patient_triage::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "triage-cli",
    about = "Fetch patient records, triage them by risk, and optionally submit the alert lists",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Build the alert report from the patient API or a saved payload (default command)
    Assess(AssessArgs),
    /// Score a single reading without touching the network
    Score(ScoreArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Assess(AssessArgs::default()));

    match command {
        Command::Assess(args) => run_assessment(args),
        Command::Score(args) => run_score(args),
    }
}
