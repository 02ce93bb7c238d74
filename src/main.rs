//! # Identity Server
//!
//! Identity and session integrity service.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Storage (PostgreSQL pool, or the in-memory store when no database is configured)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use identity_server::config::Settings;
use identity_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment and config files
    let settings = Settings::load()?;

    identity_server::telemetry::init_tracing(settings.is_production());

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!(addr = %application.local_addr()?, "Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
