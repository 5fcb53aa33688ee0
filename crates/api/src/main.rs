//! User registry - HTTP API over a JSON file store.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_lib::config::ApiConfig;
use user_service_lib::{run_store_action, StoreAction};

#[derive(Parser)]
#[command(name = "user-registry")]
#[command(about = "User registry REST API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Overrides API_HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides API_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Store maintenance
    Store {
        #[arg(value_enum)]
        action: StoreCommand,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreCommand {
    /// Create an empty store if none exists
    Init,
    /// Show store location and record count
    Status,
}

impl From<StoreCommand> for StoreAction {
    fn from(command: StoreCommand) -> Self {
        match command {
            StoreCommand::Init => StoreAction::Init,
            StoreCommand::Status => StoreAction::Status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env();

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            api_lib::run_server(config).await?;
        }
        Commands::Store { action } => {
            run_store_action(action.into(), &config.store).await?;
        }
    }

    Ok(())
}
