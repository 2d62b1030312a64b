use caja_cli::{CliError, LogConfig, Result};
use caja_core::activities::register_builtins;
use caja_core::{ActivityRegistry, SessionService};
use caja_server::{AppState, ServerConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "caja")]
#[command(version, about = "Caja - live-event audience engagement platform")]
struct Cli {
    /// Verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST backend
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Print or export the configuration schemas of registered activity types
    Schema {
        /// A single activity type (all types when omitted)
        #[arg(short = 't', long = "type")]
        type_id: Option<String>,

        /// Write one `<type>.schema.json` per type instead of printing
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::dev()
    } else {
        LogConfig::default()
    };
    log_config.init().map_err(CliError::Logging)?;

    match cli.command {
        Commands::Serve { port } => serve(port).await,
        Commands::Schema { type_id, out_dir } => export_schemas(type_id, out_dir),
    }
}

fn builtin_registry() -> ActivityRegistry {
    let mut registry = ActivityRegistry::new();
    register_builtins(&mut registry).expect("builtin types register once into a fresh registry");

    // Advisory only; a builtin missing a renderer is a packaging mistake
    for problem in registry.validate_all() {
        tracing::warn!(%problem, "Registry problem");
    }

    registry
}

async fn serve(port: u16) -> Result<()> {
    let registry = builtin_registry();
    info!("Registered activity types: {}", registry.type_ids().join(", "));

    let service = SessionService::new(Arc::new(registry));
    let state = AppState::new(service);
    let config = ServerConfig::new().with_port(port);

    info!("Starting Caja backend on port {port}");
    info!("Create a session:");
    info!(
        "  curl -X POST http://127.0.0.1:{port}/api/v1/sessions \\
     -H 'content-type: application/json' -d '{{\"name\": \"Demo\", \"admin_name\": \"Host\"}}'"
    );
    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = caja_server::serve(config, state) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}

fn export_schemas(type_id: Option<String>, out_dir: Option<PathBuf>) -> Result<()> {
    let registry = builtin_registry();

    let type_ids = match type_id {
        Some(type_id) => {
            if registry.get(&type_id).is_none() {
                return Err(CliError::UnknownActivityType(type_id));
            }
            vec![type_id]
        }
        None => registry.type_ids(),
    };

    if let Some(dir) = &out_dir {
        if !dir.is_dir() {
            return Err(CliError::InvalidSchemaDirectory { path: dir.clone() });
        }
    }

    for type_id in type_ids {
        let definition = registry
            .get(&type_id)
            .expect("listed type ids are registered");
        let schema = serde_json::to_string_pretty(&definition.schema)?;

        match &out_dir {
            Some(dir) => {
                let path = dir.join(format!("{type_id}.schema.json"));
                std::fs::write(&path, schema)?;
                info!("Wrote {}", path.display());
            }
            None => {
                println!("// {type_id} ({})", definition.name);
                println!("{schema}");
            }
        }
    }

    Ok(())
}
