//! Database connection parameters, parsed from a properties file.
//!
//! The resource is a plain `key=value` file (default name `db.properties`)
//! with keys `host`, `port`, `user`, `password`, `dbname`, `schema`. It is
//! read exactly once; [`DbConfig`] is immutable afterwards and there is no
//! reload operation.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default properties resource, resolved against the working directory.
pub const DEFAULT_PROPERTIES_FILE: &str = "db.properties";

// ── Config ──────────────────────────────────────────────────────────

/// Immutable snapshot of PostgreSQL connection parameters.
///
/// `user`, `password` and `dbname` are required; `host`, `port` and
/// `schema` are optional. A missing or empty `host` means the connection
/// target carries no host segment, and a `port` is only ever rendered
/// after a host. `schema` is stored and exposed but not applied to the
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub schema: Option<String>,
}

impl DbConfig {
    /// Load from the fixed `db.properties` resource in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(DEFAULT_PROPERTIES_FILE)
    }

    /// Load from a properties file at `path`.
    ///
    /// An unreadable file, a missing required key, or an unparseable port
    /// is a fatal [`ConfigError`]; there is no retry and no default config.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            map.insert(key, value);
        }
        Self::from_map(&map)
    }

    /// Build from already-parsed key/value pairs.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = match prop_opt(map, "port") {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "port",
                value: raw,
            })?),
            None => None,
        };

        Ok(Self {
            host: prop_opt(map, "host"),
            port,
            user: prop_required(map, "user")?,
            password: prop_required(map, "password")?,
            dbname: prop_required(map, "dbname")?,
            schema: prop_opt(map, "schema"),
        })
    }

    /// Connection target in URL form: `postgres://<host>[:<port>]/<dbname>`.
    ///
    /// With no host the host segment is omitted entirely
    /// (`postgres:///<dbname>`). Credentials are never embedded.
    pub fn url(&self) -> String {
        let mut url = String::from("postgres://");
        if let Some(host) = &self.host {
            url.push_str(host);
            if let Some(port) = self.port {
                url.push(':');
                url.push_str(&port.to_string());
            }
        }
        url.push('/');
        url.push_str(&self.dbname);
        url
    }

    /// Log the loaded parameters, password redacted.
    pub fn log_summary(&self) {
        tracing::info!(
            "db config loaded: url={}, user={}, schema={}",
            self.url(),
            self.user,
            self.schema.as_deref().unwrap_or("(none)")
        );
    }

    /// Redacted view safe for diagnostics (no password).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "user": self.user,
            "dbname": self.dbname,
            "schema": self.schema,
        })
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn prop_opt(map: &HashMap<String, String>, key: &str) -> Option<String> {
    map.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn prop_required(map: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    prop_opt(map, key).ok_or(ConfigError::MissingKey(key))
}

// ── Tests ───────────────────────────────────────────────────────────
