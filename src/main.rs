//! rri-mock - RRI mock registry server
//!
//! A TLS server speaking the RRI protocol that authenticates configured users
//! and answers every other query with success. For client development and
//! testing only.

use rri_server::config::CONFIG_ENV;
use rri_server::{tls, Config, MockServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration (from file if RRI_CONFIG is set, then env overrides)
    let config = match Config::load() {
        Ok(c) => {
            if let Ok(path) = std::env::var(CONFIG_ENV) {
                tracing::info!("Loaded config from {}", path);
            }
            c
        }
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("Configuration error: {}", e);
        return Err(e.into());
    }

    tracing::info!("Starting rri-mock (protocol {})", rri_protocol::LATEST_VERSION);
    tracing::info!("  Bind address: {}", config.network.bind_addr);

    let acceptor = if config.tls.enabled {
        let acceptor = tls::create_tls_acceptor(&config.tls)?;
        tracing::info!("  TLS: configured certificate");
        acceptor
    } else {
        tracing::warn!("  TLS: generated self-signed certificate, DO NOT USE IN PRODUCTION");
        tls::mock_tls_acceptor()?
    };

    let users = Arc::new(config.mock.user_store());
    if users.is_empty() {
        tracing::warn!("  Users: none configured, every LOGIN will fail");
    } else {
        tracing::info!("  Users: {}", users.len());
    }

    let server = Arc::new(
        MockServer::bind_addr(&config.network.bind_addr.to_string(), users, acceptor).await?,
    );

    // Spawn shutdown signal handler
    let shutdown_server = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown_server.close();
    });

    // Run server (blocks until shutdown)
    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
