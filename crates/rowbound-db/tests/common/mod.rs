//! Shared fixtures for rowbound-db integration tests.

#![allow(dead_code)]

use rowbound_db::{ConnectionConfig, ConnectionProvider, Connector, EntityType, Registry};
use tempfile::TempDir;

const SCHEMA: &str = r#"
    CREATE TABLE books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        year INTEGER,
        in_print INTEGER,
        rating REAL
    );
    CREATE TABLE categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );
    CREATE TABLE user_profiles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        display_name TEXT,
        email TEXT
    );
    CREATE TABLE countries (
        code TEXT PRIMARY KEY,
        name TEXT
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        "order" TEXT,
        "group" TEXT
    );
"#;

/// A database file in a temp directory with the test schema applied.
pub struct TestDb {
    pub provider: ConnectionProvider,
    pub registry: Registry,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rowbound.db");
        let provider = ConnectionProvider::new(ConnectionConfig::sqlite(path.to_string_lossy()));

        provider.connect().unwrap().execute_batch(SCHEMA).unwrap();

        let mut registry = Registry::new();
        registry
            .register(EntityType::new("Book").with_columns(["title", "year", "in_print", "rating"]))
            .unwrap();
        registry
            .register(EntityType::new("Category").with_columns(["name"]))
            .unwrap();
        registry.register(EntityType::new("UserProfile")).unwrap();
        registry
            .register(EntityType::new("Country").with_primary_key("code"))
            .unwrap();
        registry
            .register(EntityType::new("Order").with_columns(["order", "group"]))
            .unwrap();

        Self {
            provider,
            registry,
            _dir: dir,
        }
    }

    /// Count rows in a table with a direct query.
    pub fn count(&self, table: &str) -> i64 {
        self.provider
            .connect()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
            .unwrap()
    }
}
