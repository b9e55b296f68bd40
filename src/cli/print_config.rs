use crate::cli::{CliState, RunCommand};
use crate::config::AppConfig;
use crate::error::UsersMigrationResult;
use async_trait::async_trait;
use clap::Parser;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{EnumString, IntoStaticStr};
use tracing::info;

#[derive(Debug, Parser, Serialize)]
#[non_exhaustive]
pub struct PrintConfigArgs {
    /// Print the config with the specified format.
    #[clap(short, long, default_value = "debug")]
    pub format: Format,
}

#[derive(
    Debug, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, IntoStaticStr, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case", tag = "type")]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum Format {
    Debug,
    Json,
    JsonPretty,
    Toml,
    TomlPretty,
}

#[async_trait]
impl RunCommand for PrintConfigArgs {
    async fn run(&self, state: &CliState) -> UsersMigrationResult<()> {
        let serialized = serialize_config(&self.format, &state.config)?;

        info!("\n{}", serialized);

        Ok(())
    }
}

fn serialize_config(format: &Format, config: &AppConfig) -> UsersMigrationResult<String> {
    let serialized = match format {
        Format::Debug => {
            format!("{:?}", config)
        }
        Format::Json => serde_json::to_string(config)?,
        Format::JsonPretty => serde_json::to_string_pretty(config)?,
        Format::Toml => toml::to_string(config)?,
        Format::TomlPretty => toml::to_string_pretty(config)?,
    };
    Ok(serialized)
}
