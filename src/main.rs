use vidserve::server::signal;
use vidserve::{logger, Config, Server, ServerError};

fn main() {
    if let Err(e) = run() {
        logger::log_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> Result<(), ServerError> {
    // Optional config file path as the only argument
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    logger::init(&cfg).map_err(ServerError::Logger)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|w| *w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServerError> {
    let server = Server::bind(&cfg)?;
    signal::stop_on_signal(server.shutdown_handle());
    logger::log_server_start(&server.local_addr(), &cfg);
    server.run().await
}
