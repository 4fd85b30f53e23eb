//! Properties-driven PostgreSQL connection provider.
//!
//! [`ConnectionFactory`] owns a [`pglink_core::DbConfig`] and at most one
//! live connection, handed out as a shared [`ConnectionHandle`]:
//! - `connect` opens the connection on first use and is a no-op afterwards
//! - `disconnect` closes it and allows a later `connect` to open a new one

pub mod error;
pub mod factory;

pub use error::ConnError;
pub use factory::{ConnectionFactory, ConnectionHandle, MAX_POOLED_STATEMENTS};
