use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Connections run on a LocalSet; extra workers only serve blocking filesystem calls
    let runtime = match cfg.server.workers {
        Some(0) => return Err("server.workers must be at least 1".into()),
        Some(workers) => tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()?,
        None => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?,
    };

    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(&cfg)?);
    let listener = server::create_listener(addr)?;

    println!("Starting server on port {}...", addr.port());
    logger::log_server_start(&listener.local_addr()?, &state);
    if !state.image_dir.is_dir() {
        logger::log_warning(&format!(
            "Image directory {} does not exist; {} will answer 500",
            state.image_dir.display(),
            cfg.paths.list_path
        ));
    }

    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    logger::log_info("Server stopped");
    Ok(())
}
