// src/main.rs
// EcoAware - community backend for environmental awareness

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use ecoaware::config::{CONFIG, EcoConfig};
use ecoaware::server;

#[derive(Parser)]
#[command(name = "ecoaware")]
#[command(about = "Quizzes, events, problem reports and community posts over a REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Interface to bind
        #[arg(long, env = "ECO_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "ECO_PORT")]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,
}

fn init_tracing(config: &EcoConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_json_logging() {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CONFIG.clone();
    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            info!("Starting EcoAware API v{}", env!("CARGO_PKG_VERSION"));
            server::serve(config).await
        }
        Commands::Migrate => {
            let pool = server::create_pool(&config.database_url, 1).await?;
            server::run_migrations(&pool).await?;
            info!("Schema version {}", server::schema_version(&pool).await?);
            Ok(())
        }
    }
}
