//! rowmap command line tool.
//!
//! Stores a note through the entity mapper: loads configuration, sets up
//! structured logging, opens the configured database, and inserts one row
//! into `notes`.
//!
//! ```text
//! rowmap-cli <title> [content]
//! ```

mod config;
mod note;

use std::process::ExitCode;

use rowmap_mapper::MapperFactory;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use note::{Note, NotesTable};

fn resolve_config_path() -> (String, &'static str) {
    if let Ok(path) = std::env::var("ROWMAP_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (path, "env-var");
        }
    }

    ("rowmap.toml".to_string(), "default")
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(title) = args.next().filter(|t| !t.trim().is_empty()) else {
        eprintln!("usage: rowmap-cli <title> [content]");
        return ExitCode::from(2);
    };
    let body = args.next();

    let (config_path, config_source) = resolve_config_path();
    let config = match config::load_config(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::info!(
        source = config_source,
        path = %config_path,
        "resolved startup configuration path"
    );

    let factory = match MapperFactory::open(
        &config.database.path,
        config.database.runtime_settings(),
    ) {
        Ok(factory) => factory,
        Err(e) => {
            tracing::error!(error = %e, "failed to open database, check database.path in config");
            return ExitCode::FAILURE;
        }
    };

    let notes = match factory.get_mapper::<NotesTable>() {
        Ok(mapper) => mapper,
        Err(e) => {
            tracing::error!(error = %e, "failed to prepare notes mapper");
            return ExitCode::FAILURE;
        }
    };

    match notes.insert(&Note { title, body }) {
        Ok(row_id) => {
            println!(
                "{}",
                json!({ "table": notes.table_name(), "row_id": row_id })
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to store note");
            ExitCode::FAILURE
        }
    }
}
