//! SQL construction for entity CRUD.
//!
//! Builders here are pure: they produce the statement text and the values
//! to bind, in placeholder order. Table and column names are checked with
//! [`validate_identifier`] and written double-quoted, so a column named
//! `order` or `group` is as usable as any other; values are only ever bound.

use rowbound_common::ident::validate_identifier;
use rowbound_common::{Error, Result, Value};

use crate::entity::EntityType;
use crate::record::Record;

/// Statement text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Validate `name` and render it as a quoted identifier.
///
/// Identifiers never contain `"`, so no escaping is needed.
fn quoted(name: &str) -> Result<String> {
    Ok(format!("\"{}\"", validate_identifier(name)?))
}

impl Statement {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    /// `SELECT * FROM <table>`
    pub fn select_all(kind: &EntityType) -> Result<Self> {
        let table = quoted(kind.table())?;
        Ok(Self::new(format!("SELECT * FROM {table}"), Vec::new()))
    }

    /// `SELECT * FROM <table> WHERE <pk> = ?`
    pub fn select_by_key(kind: &EntityType, id: Value) -> Result<Self> {
        let table = quoted(kind.table())?;
        let key = quoted(kind.primary_key())?;
        Ok(Self::new(
            format!("SELECT * FROM {table} WHERE {key} = ?"),
            vec![id],
        ))
    }

    /// `SELECT * FROM <table> WHERE <column> = ?`
    ///
    /// `column` must pass the type's allow-list.
    pub fn select_where(kind: &EntityType, column: &str, value: Value) -> Result<Self> {
        let table = quoted(kind.table())?;
        if !kind.allows_column(column) {
            tracing::warn!(table = kind.table(), column, "rejected filter column");
            return Err(Error::unknown_column(kind.table(), column));
        }
        let column = quoted(column)?;
        Ok(Self::new(
            format!("SELECT * FROM {table} WHERE {column} = ?"),
            vec![value],
        ))
    }

    /// `INSERT INTO <table> (<fields>) VALUES (?, ...) RETURNING <pk>`
    ///
    /// Every field in the record is written, nulls included, in record
    /// order. An empty record inserts a row of defaults. The statement
    /// yields one row holding the stored primary key.
    pub fn insert(kind: &EntityType, record: &Record) -> Result<Self> {
        let table = quoted(kind.table())?;
        let key = quoted(kind.primary_key())?;
        if record.is_empty() {
            return Ok(Self::new(
                format!("INSERT INTO {table} DEFAULT VALUES RETURNING {key}"),
                Vec::new(),
            ));
        }

        let mut columns = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());
        for (field, value) in record.iter() {
            columns.push(quoted(field)?);
            params.push(value.clone());
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        Ok(Self::new(
            format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders}) RETURNING {key}",
                columns.join(", ")
            ),
            params,
        ))
    }

    /// `UPDATE <table> SET <field> = ?, ... WHERE <pk> = ?`
    ///
    /// Every non-key field in the record appears in the SET list; a null
    /// field writes NULL rather than being skipped. The key value is bound
    /// last.
    pub fn update(kind: &EntityType, record: &Record) -> Result<Self> {
        let table = quoted(kind.table())?;
        let key_name = kind.primary_key();
        let key = quoted(key_name)?;

        let key_value = match record.get(key_name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                return Err(Error::validation(format!(
                    "cannot update {} without a value for {key_name}",
                    kind.table()
                )))
            }
        };

        let mut assignments = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());
        for (field, value) in record.iter().filter(|(field, _)| *field != key_name) {
            assignments.push(format!("{} = ?", quoted(field)?));
            params.push(value.clone());
        }

        if assignments.is_empty() {
            return Err(Error::validation(format!(
                "nothing to update in {}: only {key_name} is set",
                kind.table()
            )));
        }

        params.push(key_value);
        Ok(Self::new(
            format!(
                "UPDATE {table} SET {} WHERE {key} = ?",
                assignments.join(", ")
            ),
            params,
        ))
    }

    /// `DELETE FROM <table> WHERE <pk> = ?`
    pub fn delete_by_key(kind: &EntityType, id: Value) -> Result<Self> {
        let table = quoted(kind.table())?;
        let key = quoted(kind.primary_key())?;
        Ok(Self::new(
            format!("DELETE FROM {table} WHERE {key} = ?"),
            vec![id],
        ))
    }
}
