mod assess;
mod cli;
mod score;

use patient_triage::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
