//! Startup registry of entity types.
//!
//! Types are registered once, usually while the application starts, and
//! looked up by name afterwards. Each type's table name is resolved at
//! registration and never recomputed.

use indexmap::IndexMap;
use rowbound_common::{Error, Result};
use std::sync::Arc;

use crate::connector::Connector;
use crate::entity::EntityType;
use crate::model::Model;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: IndexMap<String, Arc<EntityType>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any earlier type with the same name.
    ///
    /// Fails if the derived table name, primary key, or a declared column
    /// is not a plain identifier.
    pub fn register(&mut self, kind: EntityType) -> Result<Arc<EntityType>> {
        kind.validate()?;
        let kind = Arc::new(kind);
        if let Some(previous) = self.types.insert(kind.name().to_string(), Arc::clone(&kind)) {
            tracing::debug!(entity = previous.name(), "replacing registered entity type");
        }
        tracing::debug!(entity = kind.name(), table = kind.table(), "registered entity type");
        Ok(kind)
    }

    pub fn get(&self, name: &str) -> Result<Arc<EntityType>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// A CRUD handle for the named type.
    pub fn model<'c, C: Connector + ?Sized>(
        &self,
        connector: &'c C,
        name: &str,
    ) -> Result<Model<'c, C>> {
        Ok(Model::new(connector, self.get(name)?))
    }
}
