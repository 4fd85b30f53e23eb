//! Connection lifecycle: one shared PostgreSQL connection per factory.

use std::path::Path;
use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pglink_core::DbConfig;

use crate::error::ConnError;

/// Prepared-statement cache bound passed to the driver on every connect.
pub const MAX_POOLED_STATEMENTS: usize = 250;

/// Shared handle to the factory's single live connection.
pub type ConnectionHandle = Arc<Mutex<PgConnection>>;

/// Builds and owns at most one PostgreSQL connection from a [`DbConfig`].
///
/// The factory is constructed by the caller with an explicit config; there
/// is no global instance. The handle slot is mutex-guarded, so concurrent
/// first-time `connect` callers share a single physical connection instead
/// of racing to open several.
#[derive(Debug)]
pub struct ConnectionFactory {
    config: DbConfig,
    slot: Mutex<Option<ConnectionHandle>>,
}

impl ConnectionFactory {
    /// Create a factory from an already-loaded config.
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
        }
    }

    /// Load config from a properties file and create the factory.
    pub fn from_properties_file(path: impl AsRef<Path>) -> Result<Self, ConnError> {
        let config = DbConfig::from_file(path)?;
        config.log_summary();
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Whether a connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Driver options assembled from the config: target, credentials, and
    /// the statement-cache bound.
    ///
    /// Host and port are only set when configured; otherwise the driver's
    /// own defaults apply, matching the host-less target form of
    /// [`DbConfig::url`].
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut opts = PgConnectOptions::new_without_pgpass()
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.dbname)
            .statement_cache_capacity(MAX_POOLED_STATEMENTS);
        if let Some(host) = &self.config.host {
            opts = opts.host(host);
        }
        if let Some(port) = self.config.port {
            opts = opts.port(port);
        }
        opts
    }

    /// Open the connection if none exists, otherwise return the existing
    /// handle unchanged (no liveness check).
    pub async fn connect(&self) -> Result<ConnectionHandle, ConnError> {
        let mut slot = self.slot.lock().await;
        if let Some(handle) = slot.as_ref() {
            debug!("connect: reusing open connection");
            return Ok(Arc::clone(handle));
        }

        let opts = self.connect_options();
        let conn = match opts.connect().await {
            Ok(conn) => {
                info!("postgres connected: {}", self.config.url());
                conn
            }
            Err(e) => {
                warn!("failed to connect to postgres: {}", e);
                return Err(e.into());
            }
        };
        let handle = Arc::new(Mutex::new(conn));
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Close the connection if one is open; a no-op otherwise.
    ///
    /// The slot is cleared either way, so a later [`connect`] opens a fresh
    /// connection. When other handle clones are still alive the underlying
    /// connection closes once the last clone drops.
    ///
    /// [`connect`]: ConnectionFactory::connect
    pub async fn disconnect(&self) -> Result<(), ConnError> {
        let mut slot = self.slot.lock().await;
        match slot.take() {
            None => {
                debug!("disconnect: no open connection");
                Ok(())
            }
            Some(handle) => match Arc::try_unwrap(handle) {
                Ok(mutex) => {
                    mutex.into_inner().close().await?;
                    info!("postgres connection closed");
                    Ok(())
                }
                Err(_) => {
                    warn!("disconnect: handles still outstanding, close deferred to drop");
                    Ok(())
                }
            },
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DbConfig {
        DbConfig {
            host: Some("db.example.com".into()),
            port: Some(5432),
            user: "u".into(),
            password: "p".into(),
            dbname: "acb".into(),
            schema: None,
        }
    }

    #[test]
    fn options_carry_driver_parameters() {
        let factory = ConnectionFactory::new(test_config());
        let opts = factory.connect_options();
        assert_eq!(opts.get_host(), "db.example.com");
        assert_eq!(opts.get_port(), 5432);
        assert_eq!(opts.get_username(), "u");
        assert_eq!(opts.get_database(), Some("acb"));
    }

    #[tokio::test]
    async fn disconnect_without_connection_is_noop() {
        let factory = ConnectionFactory::new(test_config());
        assert!(!factory.is_connected().await);
        factory.disconnect().await.unwrap();
        assert!(!factory.is_connected().await);
    }

    #[tokio::test]
    async fn factory_from_properties_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host=db.example.com").unwrap();
        writeln!(file, "port=5432").unwrap();
        writeln!(file, "user=u").unwrap();
        writeln!(file, "password=p").unwrap();
        writeln!(file, "dbname=acb").unwrap();
        file.flush().unwrap();

        let factory = ConnectionFactory::from_properties_file(file.path()).unwrap();
        assert_eq!(factory.config().url(), "postgres://db.example.com:5432/acb");
        assert!(!factory.is_connected().await);
    }

    #[test]
    fn missing_properties_file_is_fatal() {
        let err = ConnectionFactory::from_properties_file("/nonexistent/db.properties")
            .unwrap_err();
        assert!(matches!(err, ConnError::Config(_)));
    }
}
