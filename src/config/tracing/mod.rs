use config::{FileFormat, FileSourceString};
use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};
use std::borrow::Cow;
use strum_macros::{EnumString, IntoStaticStr};
use tracing_subscriber::EnvFilter;
use validator::{Validate, ValidationError};

pub fn default_config() -> config::File<FileSourceString, FileFormat> {
    config::File::from_str(include_str!("default.toml"), FileFormat::Toml)
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct Tracing {
    pub level: String,

    /// The format to use when printing traces to logs.
    pub format: Format,

    /// Filter directives to provide to the `tracing-subscriber`
    /// [EnvFilter](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html).
    ///
    /// Useful for quieting the SQL driver, or for turning up a single module while debugging a
    /// failed schema change.
    #[serde(default)]
    #[validate(custom(function = "validate_env_filter_str"))]
    pub trace_filters: Vec<String>,
}

fn validate_env_filter_str(trace_filters: &[String]) -> Result<(), ValidationError> {
    let invalid_filters = trace_filters
        .iter()
        .filter_map(|filter| {
            let parsed_filter: Result<EnvFilter, _> = filter.parse();
            parsed_filter.err().map(|err| (filter, err.to_string()))
        })
        .collect_vec();

    if invalid_filters.is_empty() {
        return Ok(());
    }

    let (filters, errors): (Vec<_>, Vec<_>) = invalid_filters.into_iter().unzip();
    let mut err = ValidationError::new("Invalid env filter(s)");
    err.add_param(Cow::from("filters"), &filters);
    err.add_param(Cow::from("errors"), &errors);

    Err(err)
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum Format {
    /// Don't print logs at all.
    None,
    Pretty,
    Compact,
    Json,
}
