//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file at {0}")]
    NotFound(String),

    #[error("malformed config: {0}")]
    InvalidFormat(String),

    #[error("invalid {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("config references ${{{0}}} but it is not set")]
    EnvVarNotSet(String),

    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
