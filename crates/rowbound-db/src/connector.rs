//! Connection provider driven by environment variables.
//!
//! Configuration comes from five variables (`DB_CONNECTION`, `DB_HOST`,
//! `DATABASE_NAME`, `DB_USERNAME`, `DB_PASSWORD`) and is rendered into a
//! connection string of the form `<driver>:host=<host>;dbname=<database>`.
//! Connections are opened per call and never cached or pooled: whoever
//! calls [`Connector::connect`] owns the handle and closes it.

use rowbound_common::{Error, Result};
use rusqlite::{Connection, OpenFlags};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Driver identifier variable.
pub const DRIVER_VAR: &str = "DB_CONNECTION";
/// Host variable.
pub const HOST_VAR: &str = "DB_HOST";
/// Database name variable.
pub const DATABASE_VAR: &str = "DATABASE_NAME";
/// Username variable.
pub const USERNAME_VAR: &str = "DB_USERNAME";
/// Password variable.
pub const PASSWORD_VAR: &str = "DB_PASSWORD";
/// Optional busy timeout in milliseconds, bounding each round trip.
pub const BUSY_TIMEOUT_VAR: &str = "DB_BUSY_TIMEOUT_MS";

/// The driver served by the embedded engine.
pub const SQLITE_DRIVER: &str = "sqlite";

const DEFAULT_HOST: &str = "localhost";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection parameters read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: String,
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub busy_timeout_ms: Option<u64>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl ConnectionConfig {
    /// Build a config for an SQLite database file.
    ///
    /// An in-memory name is accepted here, but each connection then sees
    /// its own empty database, so it only suits single-connection use.
    pub fn sqlite(database: impl Into<String>) -> Self {
        Self {
            driver: SQLITE_DRIVER.to_string(),
            host: default_host(),
            database: database.into(),
            username: String::new(),
            password: String::new(),
            busy_timeout_ms: None,
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// `DB_CONNECTION` and `DATABASE_NAME` are required. `DB_HOST` defaults
    /// to `localhost` and the credentials default to empty strings.
    ///
    /// An in-memory SQLite database is rejected: every operation opens its
    /// own connection and would find a new, empty database.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::config(format!("{key} is not set")))
        };

        let busy_timeout_ms = match lookup(BUSY_TIMEOUT_VAR) {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u64>().map_err(|e| {
                Error::config(format!("{BUSY_TIMEOUT_VAR} must be a number of milliseconds: {e}"))
            })?),
            _ => None,
        };

        let driver = required(DRIVER_VAR)?;
        let database = required(DATABASE_VAR)?;
        if driver == SQLITE_DRIVER && is_in_memory(&database) {
            return Err(Error::config(format!(
                "{DATABASE_VAR}={database} is not supported: each operation opens a new connection"
            )));
        }

        Ok(Self {
            driver,
            host: lookup(HOST_VAR)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_host),
            database,
            username: lookup(USERNAME_VAR).unwrap_or_default(),
            password: lookup(PASSWORD_VAR).unwrap_or_default(),
            busy_timeout_ms,
        })
    }

    /// Load a `.env` file into the process environment.
    ///
    /// Variables that are already set are left alone.
    pub fn load_dotenv(path: &Path) -> Result<()> {
        dotenvy::from_path(path)
            .map_err(|e| Error::config(format!("failed to load {}: {e}", path.display())))
    }

    /// Render the connection string: `<driver>:host=<host>;dbname=<database>`.
    pub fn dsn(&self) -> String {
        Dsn {
            driver: self.driver.clone(),
            host: Some(self.host.clone()),
            dbname: Some(self.database.clone()),
        }
        .to_string()
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }
}

/// SQLite names that open a private in-memory database.
fn is_in_memory(database: &str) -> bool {
    let database = database.trim();
    database == ":memory:"
        || database.starts_with("file::memory:")
        || (database.starts_with("file:") && database.contains("mode=memory"))
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Connection strings
// ---------------------------------------------------------------------------

/// A parsed `<driver>:key=value;key=value` connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub driver: String,
    pub host: Option<String>,
    pub dbname: Option<String>,
}

impl FromStr for Dsn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (driver, rest) = s
            .split_once(':')
            .filter(|(driver, _)| !driver.is_empty())
            .ok_or_else(|| Error::config(format!("connection string {s:?} has no driver prefix")))?;

        let mut dsn = Dsn {
            driver: driver.to_string(),
            host: None,
            dbname: None,
        };

        for pair in rest.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::config(format!("malformed connection string segment {pair:?}")))?;
            match key.trim() {
                "host" => dsn.host = Some(value.to_string()),
                "dbname" => dsn.dbname = Some(value.to_string()),
                // Driver-specific options (port, charset, ...) are not used here.
                _ => {}
            }
        }

        Ok(dsn)
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.driver)?;
        let mut sep = "";
        if let Some(host) = &self.host {
            write!(f, "host={host}")?;
            sep = ";";
        }
        if let Some(dbname) = &self.dbname {
            write!(f, "{sep}dbname={dbname}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Capability flags requested when opening a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectFlags {
    /// Ask the client for a persistent (reusable) handle where it has one.
    pub persistent: bool,
}

impl Default for ConnectFlags {
    fn default() -> Self {
        Self { persistent: true }
    }
}

impl ConnectFlags {
    /// Open flags passed to SQLite.
    ///
    /// Errors always surface as `Result`, so the "errors raise" capability
    /// needs no flag of its own. The embedded engine has no persistent
    /// handle notion; `persistent` is recorded and logged only.
    fn open_flags(&self) -> OpenFlags {
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }
}

/// Something that can open a fresh database connection.
pub trait Connector {
    /// Open a new connection. The caller owns and closes it.
    fn connect(&self) -> Result<Connection>;
}

#[derive(Debug, Clone)]
enum ConfigSource {
    /// Re-read the environment on every call.
    Environment,
    Fixed(ConnectionConfig),
}

/// Opens connections from environment-sourced configuration.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    source: ConfigSource,
    flags: ConnectFlags,
}

impl ConnectionProvider {
    /// Provider that reads the environment each time it connects.
    pub fn from_env() -> Self {
        Self {
            source: ConfigSource::Environment,
            flags: ConnectFlags::default(),
        }
    }

    /// Provider with a fixed configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            source: ConfigSource::Fixed(config),
            flags: ConnectFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: ConnectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> ConnectFlags {
        self.flags
    }

    /// The configuration the next connection would use.
    pub fn config(&self) -> Result<ConnectionConfig> {
        match &self.source {
            ConfigSource::Environment => ConnectionConfig::from_env(),
            ConfigSource::Fixed(config) => Ok(config.clone()),
        }
    }
}

impl Connector for ConnectionProvider {
    fn connect(&self) -> Result<Connection> {
        let config = self.config()?;
        open_connection(&config, self.flags)
    }
}

/// Open one connection for `config`.
///
/// Never returns a half-initialized handle: if any setup step fails the
/// connection is dropped and the failure reported as [`Error::Connection`].
pub fn open_connection(config: &ConnectionConfig, flags: ConnectFlags) -> Result<Connection> {
    let dsn = config.dsn();

    if config.driver != SQLITE_DRIVER {
        tracing::warn!(dsn = %dsn, "unsupported database driver");
        return Err(Error::connection(
            dsn,
            format!("unsupported driver '{}'", config.driver),
        ));
    }

    tracing::debug!(
        dsn = %dsn,
        persistent = flags.persistent,
        has_credentials = !config.username.is_empty(),
        "opening database connection"
    );

    let conn = Connection::open_with_flags(&config.database, flags.open_flags())
        .map_err(|e| Error::connection(&dsn, e))?;

    if let Some(timeout) = config.busy_timeout() {
        conn.busy_timeout(timeout)
            .map_err(|e| Error::connection(&dsn, e))?;
    }

    Ok(conn)
}
