use crate::cli::migrate::MigrateArgs;
use crate::cli::print_config::PrintConfigArgs;
use crate::config::AppConfig;
use crate::config::environment::Environment;
use crate::error::UsersMigrationResult;
use crate::tracing::init_tracing;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_derive::Serialize;
use std::path::PathBuf;

pub mod migrate;
pub mod print_config;

/// Users migration: apply, roll back or inspect the schema change units that create the `users`
/// table.
#[derive(Debug, Parser, Serialize)]
#[command(version, about)]
#[non_exhaustive]
pub struct UsersMigrationCli {
    /// Specify the environment to use. This overrides the corresponding environment variable
    /// if it's set.
    #[clap(short, long)]
    pub environment: Option<Environment>,

    /// Skip validation of the app config. This can be useful for debugging the app config
    /// when used in conjunction with the `print-config` command.
    #[clap(long, action)]
    pub skip_validate_config: bool,

    /// Allow dangerous/destructive operations when running in the `production` environment. If
    /// this argument is not provided, dangerous/destructive operations will not be performed
    /// when running in `production`.
    #[clap(long, action)]
    pub allow_dangerous: bool,

    /// The location of the config directory (where the config files are located). If not
    /// provided, will default to `./config/`.
    #[clap(long, value_name = "CONFIG_DIRECTORY", value_hint = clap::ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: UsersMigrationCommand,
}

impl UsersMigrationCli {
    pub fn allow_dangerous(&self, config: &AppConfig) -> bool {
        config.environment != Environment::Production || self.allow_dangerous
    }
}

#[derive(Debug, Subcommand, Serialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum UsersMigrationCommand {
    /// Apply, roll back or check the status of the schema change units.
    #[clap(visible_aliases = ["m", "migration"])]
    Migrate(MigrateArgs),

    /// Print the AppConfig
    PrintConfig(PrintConfigArgs),
}

/// Everything a command needs to run.
#[non_exhaustive]
pub struct CliState {
    pub cli: UsersMigrationCli,
    pub config: AppConfig,
}

impl CliState {
    /// Load the config and initialize tracing.
    pub fn new(cli: UsersMigrationCli) -> UsersMigrationResult<Self> {
        let config = AppConfig::new(cli.environment.clone(), cli.config_dir.clone())?;

        init_tracing(&config)?;

        config.validate(!cli.skip_validate_config)?;

        Ok(Self { cli, config })
    }
}

#[async_trait]
pub trait RunCommand {
    async fn run(&self, state: &CliState) -> UsersMigrationResult<()>;
}

#[async_trait]
impl RunCommand for UsersMigrationCommand {
    async fn run(&self, state: &CliState) -> UsersMigrationResult<()> {
        match self {
            UsersMigrationCommand::Migrate(args) => args.run(state).await,
            UsersMigrationCommand::PrintConfig(args) => args.run(state).await,
        }
    }
}

/// Run the parsed command.
pub async fn run(state: &CliState) -> UsersMigrationResult<()> {
    state.cli.command.run(state).await
}
