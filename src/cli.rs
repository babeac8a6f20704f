use clap::{Parser, Subcommand};
use rowbound_common::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rowbound")]
#[command(author, version, about = "Entity persistence with convention-derived table names")]
pub struct Cli {
    /// Load connection variables from this .env file
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the table name derived from each entity type name
    TableName {
        /// Entity type names, e.g. UserProfile
        #[arg(required = true)]
        types: Vec<String>,
    },

    /// Print the connection string built from the environment
    Dsn,

    /// Print every row of an entity type as JSON lines
    All {
        /// Entity type name
        entity: String,
    },

    /// Print the row with the given primary key
    Find {
        /// Entity type name
        entity: String,

        /// Primary key value
        #[arg(value_parser = parse_value)]
        id: Value,
    },

    /// Print rows where a column equals a value
    Where {
        /// Entity type name
        entity: String,

        /// Column to filter on
        column: String,

        /// Value to match
        #[arg(value_parser = parse_value)]
        value: Value,
    },

    /// Insert a new row from field=value pairs
    Insert {
        /// Entity type name
        entity: String,

        /// Fields to set, e.g. title=Dune year=1965
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },

    /// Update the row with the given primary key from field=value pairs
    Update {
        /// Entity type name
        entity: String,

        /// Primary key value
        #[arg(value_parser = parse_value)]
        id: Value,

        /// Fields to set
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },

    /// Delete the row with the given primary key
    Destroy {
        /// Entity type name
        entity: String,

        /// Primary key value
        #[arg(value_parser = parse_value)]
        id: Value,
    },
}

/// Read a command-line value as a JSON scalar, falling back to text.
pub fn parse_value(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::Text(raw.to_string())))
}

/// Read a `field=value` pair.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {raw:?}"))?;
    if field.is_empty() {
        return Err(format!("missing field name in {raw:?}"));
    }
    Ok((field.to_string(), parse_value(value)?))
}
