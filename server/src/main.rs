use std::path::PathBuf;

use clap::Parser;
use tictactoe_common::games::tictactoe::SharedStats;
use tictactoe_common::{log, logger};
use tictactoe_server::cleanup_task::CleanupTask;
use tictactoe_server::game_service::GameService;
use tictactoe_server::server_config::{default_config_path, get_config_manager};
use tictactoe_server::session_store::SessionStore;
use tictactoe_server::web_server::run_web_server;

#[derive(Parser)]
#[command(name = "tictactoe_server")]
struct Args {
    /// Path to the YAML config. Defaults to a file next to the executable.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `bind_address` from the config.
    #[arg(long)]
    bind: Option<String>,

    #[arg(long)]
    use_log_prefix: bool,
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

    let config_path = args.config.unwrap_or_else(default_config_path);
    let mut config = get_config_manager(config_path.clone()).get_config()?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    log!(
        "Loaded config from {}: boards {}..={}, session timeout {}s",
        config_path.display(),
        config.min_board_size,
        config.max_board_size,
        config.session_inactivity_timeout_secs
    );

    let bind_address = config.bind_address.clone();
    let static_files_path = config.static_files_path.clone();
    let cleanup_interval = config.cleanup_interval();
    let inactivity_timeout = config.inactivity_timeout();

    let game_service = GameService::new(SessionStore::new(), SharedStats::new(), config);

    let cleanup_task = CleanupTask::new(game_service.clone(), cleanup_interval, inactivity_timeout);
    tokio::spawn(async move {
        cleanup_task.run().await;
    });

    run_web_server(game_service, &bind_address, static_files_path.as_deref()).await?;

    log!("Server shut down gracefully");

    Ok(())
}
