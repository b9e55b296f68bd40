use crate::error::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Unable to parse environment `{value}`: {reason}")]
    Environment { value: String, reason: String },

    #[error("Env var `{0}` not defined.")]
    MissingEnvVar(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] Box<dyn Send + Sync + std::error::Error>),
}

impl From<config::ConfigError> for Error {
    fn from(value: config::ConfigError) -> Self {
        Self::Config(ConfigError::from(value))
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Self::Config(ConfigError::from(value))
    }
}
