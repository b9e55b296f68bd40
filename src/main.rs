use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use users_migration::cli::{CliState, UsersMigrationCli, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = UsersMigrationCli::parse();

    let state = match CliState::new(cli) {
        Ok(state) => state,
        Err(err) => {
            // Tracing is not initialized if loading the config failed.
            eprintln!("Unable to initialize: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&state).await {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
