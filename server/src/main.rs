mod app_state;
mod auth;
mod cleanup_task;
mod error;
mod leaderboard;
mod middleware;
mod rate_limiter;
mod routes;
mod server_config;
mod store;
mod web_server;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use common::config::ConfigManager;
use common::{log, log_error, log_warn, logger};

use app_state::AppState;
use cleanup_task::CleanupTask;
use server_config::{DEFAULT_CONFIG_PATH, DEFAULT_JWT_SECRET, ServerConfig};
use store::{InMemoryStore, JsonFileStore, Store};

#[derive(Parser)]
#[command(name = "snake_leaderboard_server")]
struct Args {
    #[arg(long)]
    use_log_prefix: bool,

    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Overrides the port from the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager: ConfigManager<_, ServerConfig> = ConfigManager::from_yaml_file(&args.config);
    let mut config = config_manager.get_config()?;
    if !Path::new(&args.config).exists() {
        config_manager.set_config(&config)?;
        log!("Wrote default config to {}", args.config);
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.jwt_secret == DEFAULT_JWT_SECRET {
        log_warn!("jwt_secret is the built-in default; set one in {}", args.config);
    }

    let store: Arc<dyn Store> = match config.store_path.as_deref() {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => Arc::new(InMemoryStore::new()),
    };
    log!("Using {} store ({} environment)", store.kind(), config.environment);

    let state = AppState::new(store, &config)?;

    let cleanup_task = CleanupTask::new(state.rate_limiters(), config.rate_limit.cleanup_interval());
    tokio::spawn(async move {
        cleanup_task.run().await;
    });

    let shutdown_signal = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log_error!("Failed to listen for Ctrl+C: {}", err);
            return;
        }
        log!("Shutdown signal received, finishing in-flight requests...");
    };

    web_server::run_web_server(state, &config.bind_address(), shutdown_signal).await?;

    log!("Server shut down gracefully");

    Ok(())
}
