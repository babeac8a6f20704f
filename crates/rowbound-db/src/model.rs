//! CRUD operations for one entity type.
//!
//! A [`Model`] binds a [`Connector`] to an [`EntityType`]. Every operation
//! opens its own connection, runs exactly one statement, and releases the
//! connection before returning, whether the statement succeeded or not.
//! Statements auto-commit; no transaction is opened here.

use rowbound_common::{Result, Value};
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::sync::Arc;

use crate::connector::Connector;
use crate::entity::{Entity, EntityType};
use crate::record::Record;
use crate::statement::Statement;

/// Which branch [`Model::save`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    Inserted,
    Updated,
}

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub action: SaveAction,
    /// Primary key of the written row, when it is a numeric key.
    pub id: Option<i64>,
    /// Rows affected by the statement.
    pub affected: usize,
}

/// CRUD handle for one entity type.
pub struct Model<'c, C: Connector + ?Sized> {
    connector: &'c C,
    kind: Arc<EntityType>,
}

impl<'c, C: Connector + ?Sized> Model<'c, C> {
    pub fn new(connector: &'c C, kind: Arc<EntityType>) -> Self {
        Self { connector, kind }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.kind
    }

    pub fn table(&self) -> &str {
        self.kind.table()
    }

    /// A fresh, empty instance of this type.
    pub fn new_entity(&self) -> Entity {
        Entity::new(Arc::clone(&self.kind))
    }

    /// Fetch every row of the table.
    pub fn all(&self) -> Result<Vec<Entity>> {
        let statement = Statement::select_all(&self.kind)?;
        self.fetch(&statement)
    }

    /// Fetch the row whose primary key equals `id`.
    ///
    /// Returns `Ok(None)` when no row matches.
    pub fn find(&self, id: impl Into<Value>) -> Result<Option<Entity>> {
        let statement = Statement::select_by_key(&self.kind, id.into())?;
        Ok(self.fetch(&statement)?.into_iter().next())
    }

    /// Fetch every row where `column` equals `value`.
    ///
    /// `column` must be the primary key or a declared column of the type.
    pub fn where_eq(&self, column: &str, value: impl Into<Value>) -> Result<Vec<Entity>> {
        let statement = Statement::select_where(&self.kind, column, value.into())?;
        self.fetch(&statement)
    }

    /// Insert or update, depending on [`Entity::exists`].
    pub fn save(&self, entity: &mut Entity) -> Result<SaveOutcome> {
        if entity.exists() {
            self.update(entity)
        } else {
            self.insert(entity)
        }
    }

    /// Insert the entity's fields as a new row.
    ///
    /// When the primary key is unset or null, the key the database stored
    /// is written back into the entity. A null stored key leaves it unset.
    pub fn insert(&self, entity: &mut Entity) -> Result<SaveOutcome> {
        entity.ensure_kind(&self.kind)?;
        let statement = Statement::insert(&self.kind, entity.record())?;

        let stored_key = self.with_connection(|conn| {
            Ok(conn.query_row(
                &statement.sql,
                params_from_iter(statement.params.iter()),
                |row| row.get::<_, Value>(0),
            )?)
        })?;

        let key = self.kind.primary_key();
        let generated = entity.get(key).map_or(true, Value::is_null);
        if generated && !stored_key.is_null() {
            entity.set(key, stored_key);
        }

        tracing::debug!(table = self.table(), id = ?entity.id(), "inserted row");

        // One VALUES tuple (or DEFAULT VALUES) writes exactly one row.
        Ok(SaveOutcome {
            action: SaveAction::Inserted,
            id: entity.id(),
            affected: 1,
        })
    }

    /// Write every non-key field of the entity to its row.
    pub fn update(&self, entity: &Entity) -> Result<SaveOutcome> {
        entity.ensure_kind(&self.kind)?;
        let statement = Statement::update(&self.kind, entity.record())?;

        let affected = self.with_connection(|conn| {
            Ok(conn.execute(&statement.sql, params_from_iter(statement.params.iter()))?)
        })?;

        tracing::debug!(table = self.table(), id = ?entity.id(), affected, "updated row");

        Ok(SaveOutcome {
            action: SaveAction::Updated,
            id: entity.id(),
            affected,
        })
    }

    /// Delete the row whose primary key equals `id`.
    ///
    /// Returns the number of rows removed; a missing id removes zero rows
    /// and is not an error.
    pub fn destroy(&self, id: impl Into<Value>) -> Result<usize> {
        let statement = Statement::delete_by_key(&self.kind, id.into())?;

        let affected = self.with_connection(|conn| {
            Ok(conn.execute(&statement.sql, params_from_iter(statement.params.iter()))?)
        })?;

        tracing::debug!(table = self.table(), affected, "deleted rows");
        Ok(affected)
    }

    fn fetch(&self, statement: &Statement) -> Result<Vec<Entity>> {
        let records = self.with_connection(|conn| {
            let mut stmt = conn.prepare(&statement.sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let records = stmt
                .query_map(params_from_iter(statement.params.iter()), |row| {
                    Record::from_row(row, &columns)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })?;

        Ok(records
            .into_iter()
            .map(|record| Entity::from_record(Arc::clone(&self.kind), record))
            .collect())
    }

    /// Open a connection, run `op`, and close the connection on every path.
    fn with_connection<T>(&self, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.connector.connect()?;
        tracing::trace!(table = self.table(), "connection opened");

        let result = op(&conn);
        if let Err((_, e)) = conn.close() {
            tracing::warn!(table = self.table(), error = %e, "failed to close connection");
        }

        if let Err(e) = &result {
            tracing::debug!(table = self.table(), error = %e, "statement failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{ConnectionConfig, ConnectionProvider};
    use rowbound_common::Error;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Provider over a temp file, counting opened connections.
    struct CountingConnector {
        inner: ConnectionProvider,
        opened: Cell<usize>,
        _dir: TempDir,
    }

    impl CountingConnector {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("test.db");
            let inner = ConnectionProvider::new(ConnectionConfig::sqlite(path.to_string_lossy()));
            inner
                .connect()
                .unwrap()
                .execute_batch(
                    "CREATE TABLE books (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        title TEXT NOT NULL,
                        year INTEGER
                    );",
                )
                .unwrap();
            Self {
                inner,
                opened: Cell::new(0),
                _dir: dir,
            }
        }
    }

    impl Connector for CountingConnector {
        fn connect(&self) -> Result<Connection> {
            self.opened.set(self.opened.get() + 1);
            self.inner.connect()
        }
    }

    fn book_type() -> Arc<EntityType> {
        Arc::new(EntityType::new("Book").with_columns(["title", "year"]))
    }

    #[test]
    fn test_save_inserts_new_entity() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());

        let mut book = books.new_entity();
        book.set("title", "Dune").set("year", 1965);
        let outcome = books.save(&mut book).unwrap();

        assert_eq!(outcome.action, SaveAction::Inserted);
        assert_eq!(outcome.affected, 1);
        assert_eq!(outcome.id, Some(1));
        assert_eq!(book.get("id"), Some(&Value::Integer(1)));
        assert!(book.exists());
    }

    #[test]
    fn test_save_updates_existing_entity() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());

        let mut book = books.new_entity();
        book.set("title", "Dune").set("year", 1965);
        books.save(&mut book).unwrap();

        book.set("title", "Dune Messiah").set("year", 1969);
        let outcome = books.save(&mut book).unwrap();
        assert_eq!(outcome.action, SaveAction::Updated);
        assert_eq!(outcome.affected, 1);

        let all = books.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("title"), Some(&Value::from("Dune Messiah")));
    }

    #[test]
    fn test_update_writes_null_for_unset_fields() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());

        let mut book = books.new_entity();
        book.set("title", "Dune").set("year", 1965);
        books.save(&mut book).unwrap();

        book.set("year", Value::Null);
        books.save(&mut book).unwrap();

        let found = books.find(1).unwrap().unwrap();
        assert_eq!(found.get("year"), Some(&Value::Null));
    }

    #[test]
    fn test_non_numeric_key_takes_insert_path() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());

        let mut book = books.new_entity();
        book.set("id", "abc").set("title", "Dune");
        assert!(!book.exists());

        // The insert is attempted and the column type rejects the text key.
        let err = books.save(&mut book).unwrap_err();
        assert!(err.is_database());
    }

    #[test]
    fn test_find_missing_is_none() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());
        assert!(books.find(42).unwrap().is_none());
    }

    #[test]
    fn test_destroy_missing_is_zero() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());
        assert_eq!(books.destroy(42).unwrap(), 0);
    }

    #[test]
    fn test_where_eq_filters() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());

        for (title, year) in [("Dune", 1965), ("Emma", 1815), ("Dune", 1984)] {
            let mut book = books.new_entity();
            book.set("title", title).set("year", year);
            books.save(&mut book).unwrap();
        }

        let dunes = books.where_eq("title", "Dune").unwrap();
        assert_eq!(dunes.len(), 2);
        assert!(dunes.iter().all(|b| b.get("title") == Some(&Value::from("Dune"))));

        assert!(matches!(
            books.where_eq("price", 10),
            Err(Error::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_one_connection_per_operation() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());

        let mut book = books.new_entity();
        book.set("title", "Dune");
        books.save(&mut book).unwrap();
        books.all().unwrap();
        books.find(1).unwrap();
        books.destroy(1).unwrap();
        assert_eq!(connector.opened.get(), 4);

        // A rejected column never reaches the database.
        let _ = books.where_eq("bogus column", 1);
        assert_eq!(connector.opened.get(), 4);
    }

    #[test]
    fn test_driver_failure_is_database_error() {
        let connector = CountingConnector::new();
        let authors = Model::new(&connector, Arc::new(EntityType::new("Author")));

        let err = authors.all().unwrap_err();
        assert!(err.is_database());
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_connection_failure_propagates() {
        let mut config = ConnectionConfig::sqlite("shop");
        config.driver = "pgsql".into();
        let provider = ConnectionProvider::new(config);
        let books = Model::new(&provider, book_type());

        assert!(books.all().unwrap_err().is_connection());
        assert!(books.find(1).unwrap_err().is_connection());
        assert!(books.destroy(1).unwrap_err().is_connection());
    }

    #[test]
    fn test_rejects_entity_of_other_type() {
        let connector = CountingConnector::new();
        let books = Model::new(&connector, book_type());
        let mut author = Entity::new(Arc::new(EntityType::new("Author")));
        author.set("name", "Herbert");

        assert!(matches!(books.save(&mut author), Err(Error::Validation(_))));
    }
}
