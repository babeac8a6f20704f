//! Command handlers for the rowbound binary.

use anyhow::{bail, Result};
use rowbound_common::Value;
use rowbound_db::naming::derive_table_name;
use rowbound_db::{ConnectionConfig, ConnectionProvider, Entity, EntityType, Model, Registry};

/// Registry holding the single entity type a command works on.
fn model_for<'c>(
    provider: &'c ConnectionProvider,
    registry: &mut Registry,
    entity: &str,
) -> Result<Model<'c, ConnectionProvider>> {
    if !registry.contains(entity) {
        registry.register(EntityType::new(entity))?;
    }
    Ok(registry.model(provider, entity)?)
}

fn print_entities(entities: &[Entity]) -> Result<()> {
    for entity in entities {
        println!("{}", serde_json::to_string(entity.record())?);
    }
    Ok(())
}

pub fn table_names(types: &[String]) {
    for name in types {
        println!("{name}\t{}", derive_table_name(name));
    }
}

pub fn dsn() -> Result<()> {
    let config = ConnectionConfig::from_env()?;
    println!("{}", config.dsn());
    Ok(())
}

pub fn all(provider: &ConnectionProvider, entity: &str) -> Result<()> {
    let mut registry = Registry::new();
    let model = model_for(provider, &mut registry, entity)?;
    let rows = model.all()?;
    tracing::info!("Fetched {} rows from {}", rows.len(), model.table());
    print_entities(&rows)
}

pub fn find(provider: &ConnectionProvider, entity: &str, id: Value) -> Result<()> {
    let mut registry = Registry::new();
    let model = model_for(provider, &mut registry, entity)?;
    match model.find(id.clone())? {
        Some(found) => print_entities(&[found]),
        None => bail!("No {} row with {} = {}", model.table(), model.entity_type().primary_key(), id),
    }
}

pub fn where_eq(provider: &ConnectionProvider, entity: &str, column: &str, value: Value) -> Result<()> {
    let mut registry = Registry::new();
    let model = model_for(provider, &mut registry, entity)?;
    let rows = model.where_eq(column, value)?;
    tracing::info!("Matched {} rows in {}", rows.len(), model.table());
    print_entities(&rows)
}

pub fn insert(provider: &ConnectionProvider, entity: &str, fields: Vec<(String, Value)>) -> Result<()> {
    let mut registry = Registry::new();
    let model = model_for(provider, &mut registry, entity)?;

    let mut row = model.new_entity();
    for (field, value) in fields {
        row.set(field, value);
    }

    let outcome = model.insert(&mut row)?;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

pub fn update(
    provider: &ConnectionProvider,
    entity: &str,
    id: Value,
    fields: Vec<(String, Value)>,
) -> Result<()> {
    let mut registry = Registry::new();
    let model = model_for(provider, &mut registry, entity)?;

    let mut row = model.new_entity();
    row.set(model.entity_type().primary_key(), id);
    for (field, value) in fields {
        row.set(field, value);
    }

    let outcome = model.update(&row)?;
    if outcome.affected == 0 {
        tracing::warn!("No {} row matched; nothing updated", model.table());
    }
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

pub fn destroy(provider: &ConnectionProvider, entity: &str, id: Value) -> Result<()> {
    let mut registry = Registry::new();
    let model = model_for(provider, &mut registry, entity)?;
    let affected = model.destroy(id)?;
    println!("{}", serde_json::json!({ "deleted": affected > 0, "affected": affected }));
    Ok(())
}
