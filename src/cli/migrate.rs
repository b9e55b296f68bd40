use crate::cli::{CliState, RunCommand};
use crate::db::connect;
use crate::error::UsersMigrationResult;
use crate::error::cli::CliError;
use crate::migration::{DownArgs, Runner, UpArgs, UsersMigrator};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_derive::Serialize;
use tracing::{info, warn};

#[derive(Debug, Parser, Serialize)]
#[non_exhaustive]
pub struct MigrateArgs {
    #[clap(subcommand)]
    pub command: MigrateCommand,
}

#[async_trait]
impl RunCommand for MigrateArgs {
    async fn run(&self, state: &CliState) -> UsersMigrationResult<()> {
        self.command.run(state).await
    }
}

#[derive(Debug, Subcommand, Serialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum MigrateCommand {
    /// Apply pending schema change units
    Up(UpArgs),
    /// Roll back applied schema change units
    Down(DownArgs),
    /// Roll back all applied units, then reapply all units
    Refresh,
    /// Roll back all applied units
    Reset,
    /// Drop all tables from the database, then reapply all units
    Fresh,
    /// Print the status of all units
    Status,
}

impl MigrateCommand {
    fn name(&self) -> &'static str {
        match self {
            MigrateCommand::Up(_) => "up",
            MigrateCommand::Down(_) => "down",
            MigrateCommand::Refresh => "refresh",
            MigrateCommand::Reset => "reset",
            MigrateCommand::Fresh => "fresh",
            MigrateCommand::Status => "status",
        }
    }
}

#[async_trait]
impl RunCommand for MigrateCommand {
    async fn run(&self, state: &CliState) -> UsersMigrationResult<()> {
        let environment = &state.config.environment;
        if is_destructive(self) && !state.cli.allow_dangerous(&state.config) {
            return Err(CliError::DestructiveCmdNotAllowed {
                command: self.name().to_string(),
                environment: environment.clone(),
            }
            .into());
        } else if is_destructive(self) {
            warn!(
                "Running destructive command `{}` in environment `{}`",
                self.name(),
                environment
            );
        }

        let db = connect(&state.config.database).await?;
        let runner = Runner::new(UsersMigrator);

        match self {
            MigrateCommand::Up(args) => {
                let count = runner.up(&db, args).await?;
                info!("Applied {count} schema change unit(s)");
            }
            MigrateCommand::Down(args) => {
                let count = runner.down(&db, args).await?;
                info!("Rolled back {count} schema change unit(s)");
            }
            MigrateCommand::Refresh => runner.refresh(&db).await?,
            MigrateCommand::Reset => runner.reset(&db).await?,
            MigrateCommand::Fresh => runner.fresh(&db).await?,
            MigrateCommand::Status => {
                for migration in runner.status(&db).await? {
                    let status: &str = migration.status.into();
                    info!("{status}\t{}", migration.name);
                }
            }
        };

        Ok(())
    }
}

fn is_destructive(command: &MigrateCommand) -> bool {
    !matches!(command, MigrateCommand::Up(_) | MigrateCommand::Status)
}
