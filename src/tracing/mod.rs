use crate::config::AppConfig;
use crate::config::tracing::Format;
use crate::error::UsersMigrationResult;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub fn init_tracing(config: &AppConfig) -> UsersMigrationResult<()> {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(Level::from_str(&config.tracing.level)?.into())
        .from_env()?;
    for filter in config.tracing.trace_filters.iter() {
        env_filter = env_filter.add_directive(filter.parse()?);
    }

    let stdout_layer = match config.tracing.format {
        Format::None => None,
        Format::Pretty => Some(tracing_subscriber::fmt::layer().pretty().boxed()),
        Format::Compact => Some(tracing_subscriber::fmt::layer().compact().boxed()),
        Format::Json => Some(tracing_subscriber::fmt::layer().json().boxed()),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}
