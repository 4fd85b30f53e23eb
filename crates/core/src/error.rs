use thiserror::Error;

/// Fatal configuration failures: a factory cannot be built from a broken
/// properties resource.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read db properties: {0}")]
    Read(#[from] dotenvy::Error),

    #[error("missing required property: {0}")]
    MissingKey(&'static str),

    #[error("invalid value for property '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },
}
