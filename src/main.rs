use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homehub::cli::Args;
use homehub::config::{load_config, HubConfig};
use homehub::http::HttpServer;
use homehub::plugins;
use homehub::PluginHost;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "homehub=debug,tower_http=debug"
    } else {
        "homehub=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("homehub v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => HubConfig::default(),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let config = Arc::new(config);

    tracing::info!(
        port = config.server.port,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let mut host = PluginHost::new(config.clone());
    for (name, factory) in plugins::builtin(&config) {
        host.load(name, factory);
    }
    let host = Arc::new(host);
    tracing::info!(
        plugins = host.plugin_count(),
        endpoints = host.router().endpoints().len(),
        "Plugins loaded"
    );

    let listener = TcpListener::bind(("0.0.0.0", config.server.port)).await?;
    let server = HttpServer::new(&config, host.clone());
    server.run(listener).await?;

    host.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
