//! Rowbound-DB: entity persistence over SQLite.
//!
//! This crate gives any domain type create, read, update and delete
//! persistence without per-field declarations, using rusqlite.
//!
//! # Modules
//!
//! - `connector` - Connection provider configured from environment variables
//! - `naming` - Type name to table name conventions
//! - `record` - The ordered property bag behind an entity
//! - `entity` - Entity types and instances
//! - `registry` - Startup registration of entity types
//! - `statement` - Parameterized SQL construction
//! - `model` - CRUD operations for one entity type
//!
//! # Example
//!
//! ```no_run
//! use rowbound_db::connector::ConnectionProvider;
//! use rowbound_db::entity::EntityType;
//! use rowbound_db::registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register(EntityType::new("Book").with_columns(["title", "year"])).unwrap();
//!
//! let provider = ConnectionProvider::from_env();
//! let books = registry.model(&provider, "Book").unwrap();
//!
//! let mut book = books.new_entity();
//! book.set("title", "Dune").set("year", 1965);
//! let outcome = books.save(&mut book).unwrap();
//! println!("Saved book {:?} into {}", outcome.id, books.table());
//! ```

pub mod connector;
pub mod entity;
pub mod model;
pub mod naming;
pub mod record;
pub mod registry;
pub mod statement;

pub use connector::{ConnectionConfig, ConnectionProvider, Connector};
pub use entity::{Entity, EntityType};
pub use model::{Model, SaveAction, SaveOutcome};
pub use record::Record;
pub use registry::Registry;
