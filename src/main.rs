mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use rowbound_db::{ConnectionConfig, ConnectionProvider};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "rowbound=debug,rowbound_db=trace".to_string()
        } else {
            "rowbound=info,rowbound_db=info".to_string()
        }
    });

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.env_file.as_deref() {
        Some(path) => ConnectionConfig::load_dotenv(path)?,
        None => {
            if let Ok(path) = dotenvy::dotenv() {
                tracing::debug!("Loaded environment from {}", path.display());
            }
        }
    }

    let provider = ConnectionProvider::from_env();

    match cli.command {
        Commands::TableName { types } => {
            commands::table_names(&types);
            Ok(())
        }
        Commands::Dsn => commands::dsn(),
        Commands::All { entity } => commands::all(&provider, &entity),
        Commands::Find { entity, id } => commands::find(&provider, &entity, id),
        Commands::Where {
            entity,
            column,
            value,
        } => commands::where_eq(&provider, &entity, &column, value),
        Commands::Insert { entity, fields } => commands::insert(&provider, &entity, fields),
        Commands::Update { entity, id, fields } => {
            commands::update(&provider, &entity, id, fields)
        }
        Commands::Destroy { entity, id } => commands::destroy(&provider, &entity, id),
    }
}
