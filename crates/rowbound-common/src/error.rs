//! Unified error type for rowbound.
//!
//! Every failure in the persistence layer, from opening a session to
//! executing a statement, is reported through [`Error`]. No operation hands
//! back a driver message as if it were a successful result.

use std::fmt;

/// Unified error type covering all failure modes in rowbound.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A database session could not be established.
    #[error("Connection error [{dsn}]: {message}")]
    Connection {
        /// The connection string that was attempted (never includes credentials).
        dsn: String,
        /// The native error message from the driver.
        message: String,
    },

    /// A prepared or executed statement failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying driver error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Connection configuration is missing or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// A table or column name is not a safe SQL identifier.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A filter column is not among the entity type's known fields.
    #[error("Unknown column {column:?} for table {table}")]
    UnknownColumn {
        /// The table being queried.
        table: String,
        /// The rejected column name.
        column: String,
    },

    /// No entity type with this name has been registered.
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    /// A write cannot be expressed with the entity's current fields.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Convenience constructor for [`Error::Connection`].
    pub fn connection(dsn: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Connection {
            dsn: dsn.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Config`].
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Convenience constructor for [`Error::UnknownColumn`].
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Whether this error came from establishing a session.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Whether this error came from a failed statement.
    pub fn is_database(&self) -> bool {
        matches!(self, Error::Database { .. })
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::database(err)
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_display() {
        let err = Error::connection("sqlite:host=localhost;dbname=app.db", "unable to open");
        assert_eq!(
            err.to_string(),
            "Connection error [sqlite:host=localhost;dbname=app.db]: unable to open"
        );
        assert!(err.is_connection());
        assert!(!err.is_database());
    }

    #[test]
    fn database_display() {
        let err = Error::database("no such table: books");
        assert!(err.to_string().contains("no such table: books"));
        assert!(err.is_database());
    }

    #[test]
    fn database_from_rusqlite() {
        let err = Error::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, Error::Database { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_display() {
        let err = Error::config("DB_CONNECTION is not set");
        assert_eq!(err.to_string(), "Config error: DB_CONNECTION is not set");
    }

    #[test]
    fn unknown_column_display() {
        let err = Error::unknown_column("books", "title; DROP TABLE books");
        assert_eq!(
            err.to_string(),
            "Unknown column \"title; DROP TABLE books\" for table books"
        );
    }

    #[test]
    fn validation_display() {
        let err = Error::validation("nothing to update");
        assert_eq!(err.to_string(), "Validation error: nothing to update");
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<usize> {
            Ok(1)
        }
        assert_eq!(ok_fn().unwrap(), 1);

        fn err_fn() -> Result<usize> {
            Err(Error::UnknownEntity("Ghost".into()))
        }
        assert!(err_fn().is_err());
    }
}
