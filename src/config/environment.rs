use crate::config::{ENV_VAR_PREFIX, ENV_VAR_SEPARATOR};
use crate::error::UsersMigrationResult;
use crate::error::config::ConfigError;
#[cfg(feature = "cli")]
use clap::ValueEnum;
#[cfg(feature = "cli")]
use clap::builder::PossibleValue;
use const_format::concatcp;
use serde_derive::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
#[cfg(feature = "cli")]
use std::sync::OnceLock;

/// The environment the migrations run against. Destructive CLI commands are refused in
/// [`Environment::Production`] unless explicitly allowed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Environment {
    Development,
    Test,
    Production,
    #[serde(untagged)]
    Custom(String),
}

#[cfg(feature = "cli")]
static ENV_VARIANTS: OnceLock<Vec<Environment>> = OnceLock::new();

const DEVELOPMENT: &str = "development";
const TEST: &str = "test";
const PRODUCTION: &str = "production";

// We need to manually implement (vs. deriving) `ValueEnum` in order to support the
// `Environment::Custom` variant.
#[cfg(feature = "cli")]
impl ValueEnum for Environment {
    fn value_variants<'a>() -> &'a [Self] {
        ENV_VARIANTS.get_or_init(|| {
            vec![
                Environment::Development,
                Environment::Test,
                Environment::Production,
                Environment::Custom("<custom>".to_string()),
            ]
        })
    }

    fn from_str(input: &str, _ignore_case: bool) -> Result<Self, String> {
        <Environment as FromStr>::from_str(input)
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Environment::Development => Some(PossibleValue::new(DEVELOPMENT).alias("dev")),
            Environment::Test => Some(PossibleValue::new(TEST)),
            Environment::Production => Some(PossibleValue::new(PRODUCTION).alias("prod")),
            Environment::Custom(custom) => Some(
                PossibleValue::new(custom).help("Any other value will be captured as a String."),
            ),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "{DEVELOPMENT}"),
            Environment::Test => write!(f, "{TEST}"),
            Environment::Production => write!(f, "{PRODUCTION}"),
            Environment::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("environment must not be empty".to_string());
        }
        let env = match trimmed.to_lowercase().as_str() {
            DEVELOPMENT | "dev" => Environment::Development,
            TEST => Environment::Test,
            PRODUCTION | "prod" => Environment::Production,
            _ => Environment::Custom(trimmed.to_string()),
        };
        Ok(env)
    }
}

/// Key of the environment in the assembled config.
pub(crate) const ENVIRONMENT_KEY: &str = "environment";

const ENVIRONMENT_ENV_VAR_NAME: &str = "ENVIRONMENT";

pub(crate) const ENV_VAR_WITH_PREFIX: &str =
    concatcp!(ENV_VAR_PREFIX, ENV_VAR_SEPARATOR, ENVIRONMENT_ENV_VAR_NAME);

impl Environment {
    // This runs before tracing is initialized, so we need to use `println` in order to
    // log from this method.
    #[allow(clippy::disallowed_macros)]
    pub fn new() -> UsersMigrationResult<Self> {
        let environment = env::var(ENV_VAR_WITH_PREFIX)
            .map_err(|_| ConfigError::MissingEnvVar(ENV_VAR_WITH_PREFIX.to_string()))?;
        let environment = <Environment as FromStr>::from_str(&environment).map_err(|reason| {
            ConfigError::Environment {
                value: environment.clone(),
                reason,
            }
        })?;
        println!("Using environment from `{ENV_VAR_WITH_PREFIX}` env var: {environment:?}");
        Ok(environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DEVELOPMENT, Environment::Development)]
    #[case("dev", Environment::Development)]
    #[case("Dev", Environment::Development)]
    #[case(TEST, Environment::Test)]
    #[case(PRODUCTION, Environment::Production)]
    #[case("prod", Environment::Production)]
    #[case("staging", Environment::Custom("staging".to_string()))]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn environment_from_str(#[case] input: &str, #[case] expected: Environment) {
        let env = <Environment as FromStr>::from_str(input).unwrap();
        assert_eq!(env, expected);
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn environment_from_empty_str() {
        assert!(<Environment as FromStr>::from_str("  ").is_err());
    }

    #[rstest]
    #[case(Environment::Development, "development")]
    #[case(Environment::Production, "production")]
    #[case(Environment::Custom("staging".to_string()), "staging")]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn environment_to_string(#[case] env: Environment, #[case] expected: &str) {
        assert_eq!(env.to_string(), expected);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        env: Environment,
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn environment_serialize_json() {
        let json = serde_json::to_string(&Wrapper {
            env: Environment::Production,
        })
        .unwrap();
        insta::assert_snapshot!(json, @r#"{"env":"production"}"#);

        let custom: Wrapper = serde_json::from_str(r#"{"env":"staging"}"#).unwrap();
        assert_eq!(custom.env, Environment::Custom("staging".to_string()));
    }

    #[test]
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn env_var_name() {
        assert_eq!(ENV_VAR_WITH_PREFIX, "USERS_MIGRATION__ENVIRONMENT");
    }
}
