//! Entity types and entity instances.
//!
//! An [`EntityType`] describes one kind of domain object: its name, the
//! table derived from that name, its primary key, and optionally the columns
//! it is known to have. An [`Entity`] is one instance of such a type, backed
//! by a [`Record`].

use rowbound_common::{ident, Error, Result, Value};
use std::sync::Arc;

use crate::naming::derive_table_name;
use crate::record::Record;

/// Primary key column used unless a type overrides it.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Description of one entity type.
///
/// The table name is derived from the type name once, on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    table: String,
    primary_key: String,
    columns: Vec<String>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = derive_table_name(&name);
        Self {
            name,
            table,
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Declare the columns this type is known to have.
    ///
    /// Declared columns form the allow-list for filter columns in
    /// [`Model::where_eq`](crate::model::Model::where_eq).
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `column` may be used as a filter column.
    ///
    /// The primary key is always allowed. With no declared columns any plain
    /// identifier is allowed; otherwise only declared columns are.
    pub fn allows_column(&self, column: &str) -> bool {
        if !ident::is_identifier(column) {
            return false;
        }
        column == self.primary_key
            || self.columns.is_empty()
            || self.columns.iter().any(|c| c == column)
    }

    /// Check that every name this type interpolates into SQL is an identifier.
    pub fn validate(&self) -> Result<()> {
        ident::validate_identifier(&self.table)?;
        ident::validate_identifier(&self.primary_key)?;
        for column in &self.columns {
            ident::validate_identifier(column)?;
        }
        Ok(())
    }
}

/// One instance of an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: Arc<EntityType>,
    record: Record,
}

impl Entity {
    /// An empty instance: no fields set.
    pub fn new(kind: Arc<EntityType>) -> Self {
        Self::from_record(kind, Record::new())
    }

    pub fn from_record(kind: Arc<EntityType>, record: Record) -> Self {
        Self { kind, record }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.kind
    }

    pub fn table(&self) -> &str {
        self.kind.table()
    }

    pub fn primary_key(&self) -> &str {
        self.kind.primary_key()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Set a field. No coercion or validation happens here.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.record.set(field, value);
        self
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// The primary key, if it holds a usable row key.
    pub fn id(&self) -> Option<i64> {
        self.get(self.primary_key()).and_then(Value::as_key)
    }

    /// Whether this instance refers to an existing row.
    ///
    /// True when the primary key holds a positive integer, or a real or
    /// text value that reads as one. A non-numeric string key does not
    /// count, so saving such an entity inserts it.
    pub fn exists(&self) -> bool {
        self.id().is_some()
    }

    pub(crate) fn ensure_kind(&self, kind: &EntityType) -> Result<()> {
        if self.kind.name() == kind.name() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "entity of type {} cannot be stored in {}",
                self.kind.name(),
                kind.table()
            )))
        }
    }
}
