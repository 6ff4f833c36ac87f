mod api_client;
mod api_task;
mod config;
mod state;
mod ui;

use clap::Parser;
use common::game::{CELL_SIZE, GRID_SIZE};
use common::{log, log_error, logger};
use eframe::egui;
use tokio::sync::mpsc;

use api_client::ApiClient;
use api_task::api_task;
use state::{CommandSender, SharedState};
use ui::SnakeApp;

#[derive(Parser)]
#[command(name = "snake_client")]
struct Args {
    #[arg(long)]
    use_log_prefix: bool,

    /// Config file; defaults to one next to the executable.
    #[arg(long)]
    config: Option<String>,

    /// Overrides `server_url` from the config file.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Client".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager = config::get_config_manager(args.config.as_deref());
    let mut config = config_manager.get_config()?;
    if let Some(server_url) = args.server_url {
        config.server_url = server_url;
    }
    log!("Using API at {}", config.server_url);

    let client = ApiClient::new(&config.server_url)?;
    let shared_state = SharedState::new();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let shared_state_clone = shared_state.clone();
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log_error!("Failed to start API runtime: {}", e);
                return;
            }
        };
        rt.block_on(api_task(client, shared_state_clone, command_rx));
    });

    let board_size = (GRID_SIZE as u32 * CELL_SIZE) as f32;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([board_size + 340.0, board_size + 200.0])
            .with_title("Snake"),
        ..Default::default()
    };

    eframe::run_native(
        "Snake Client",
        options,
        Box::new(|_cc| {
            Ok(Box::new(SnakeApp::new(
                config_manager,
                config,
                shared_state,
                CommandSender::new(command_tx),
            )))
        }),
    )?;

    Ok(())
}
