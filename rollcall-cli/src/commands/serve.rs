//! HTTP server command
//!
//! Runs the rollcall API server. Every flag can also come from the
//! environment (or a `.env` file in the working directory).

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;

use rollcall_server::config::DEFAULT_PORT;
use rollcall_server::db::connection::DEFAULT_MAX_CONNECTIONS;
use rollcall_server::{run_server, ConnectMode, CorsOrigins, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Allowed CORS origins: `*` or a comma-separated list
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: CorsOrigins,

    /// When to open the database connection: `lazy` (first request) or `eager` (startup)
    #[arg(long, env = "CONNECT_MODE", default_value = "lazy")]
    pub connect_mode: ConnectMode,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors: self.cors_origins,
            connect_mode: self.connect_mode,
            max_connections: self.max_connections,
            ..ServerConfig::new(self.database_url)
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.into_config();
    tracing::info!(
        bind = %config.bind_addr,
        connect_mode = ?config.connect_mode,
        cors = ?config.cors,
        "Starting rollcall server"
    );

    // Run server (blocks until shutdown)
    run_server(config).await.context("Server error")?;

    Ok(())
}
