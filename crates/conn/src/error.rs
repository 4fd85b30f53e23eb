use thiserror::Error;

/// Errors surfaced by the connection factory.
///
/// Config failures are fatal at load time; connect/close failures are
/// explicit values the caller can distinguish from "not yet connected".
#[derive(Error, Debug)]
pub enum ConnError {
    #[error("config error: {0}")]
    Config(#[from] pglink_core::ConfigError),

    #[error("postgres error: {0}")]
    Connect(#[from] sqlx::Error),
}
