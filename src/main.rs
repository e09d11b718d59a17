use std::sync::Arc;

use tracing::{error, info};

use netdiag::api::{Adapters, Diagnostics, Settings};
use netdiag::{logging, middleware, Config, Server, VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        e
    })?;

    logging::init(&config.logging);

    info!("Starting netdiag {}...", VERSION);
    config.log_summary();

    let worker_threads = num_cpus::get();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    info!("Runtime ready ({} worker threads)", worker_threads);

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let adapters = Adapters::from_config(&config)?;
    info!(
        "Adapters: resolver={}, probe={}, host={}, public_ip={}",
        adapters.resolver.name(),
        adapters.probe.name(),
        adapters.host.name(),
        adapters.public_ip.name()
    );

    let diagnostics = Diagnostics::new(adapters, Settings::from_config(&config));
    let chain = middleware::default_chain(&config.middleware);
    info!("Middleware: {}", chain.names().join(", "));

    let server = Arc::new(
        Server::bind(config.server.listen_addr, diagnostics, chain)
            .await
            .map_err(|e| {
                error!("Failed to bind {}: {}", config.server.listen_addr, e);
                e
            })?,
    );

    let runner = Arc::clone(&server);
    let accept_loop = tokio::spawn(async move { runner.run().await });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    if server.shutdown(accept_loop, config.server.drain_timeout).await {
        info!("All connections drained");
    }

    Ok(())
}
