//! Server configuration
//!
//! Values arrive from the CLI (flags or environment):
//! - `DATABASE_URL`: Postgres connection string (required)
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:5000)
//! - `CORS_ORIGINS`: `*` or comma-separated origins (default: `*`)
//! - `CONNECT_MODE`: `lazy` or `eager` (default: `lazy`)
//! - `DB_MAX_CONNECTIONS`: pool size (default: 5)

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::db::connection::DEFAULT_MAX_CONNECTIONS;

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid CORS origin '{origin}'")]
    InvalidOrigin { origin: String },

    #[error("CORS origin list is empty")]
    NoOrigins,

    #[error("invalid connect mode '{0}' (expected 'lazy' or 'eager')")]
    InvalidConnectMode(String),
}

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`
    Any,
    List(Vec<String>),
}

impl FromStr for CorsOrigins {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "*" {
            return Ok(Self::Any);
        }

        let origins: Vec<String> = s
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_owned())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() {
            return Err(ConfigError::NoOrigins);
        }
        Ok(Self::List(origins))
    }
}

impl CorsOrigins {
    /// Build the CORS layer: fixed methods and headers, configured origins.
    pub fn layer(&self) -> Result<CorsLayer, ConfigError> {
        let allow_origin = match self {
            Self::Any => AllowOrigin::from(Any),
            Self::List(origins) => {
                let values = origins
                    .iter()
                    .map(|o| {
                        HeaderValue::from_str(o)
                            .map_err(|_| ConfigError::InvalidOrigin { origin: o.clone() })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                AllowOrigin::list(values)
            }
        };

        Ok(CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
    }
}

/// When the database connection is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectMode {
    /// On the first API request; failures answer 500 per request
    #[default]
    Lazy,
    /// During startup; failures stop the process
    Eager,
}

impl FromStr for ConnectMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            _ => Err(ConfigError::InvalidConnectMode(s.to_owned())),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:5000)
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors: CorsOrigins,
    pub connect_mode: ConnectMode,
    pub max_connections: u32,
}

impl ServerConfig {
    /// Defaults for everything except the connection string.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            database_url: database_url.into(),
            cors: CorsOrigins::Any,
            connect_mode: ConnectMode::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::new("postgres://localhost/rollcall");
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.cors, CorsOrigins::Any);
        assert_eq!(config.connect_mode, ConnectMode::Lazy);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn parses_wildcard_and_lists() {
        assert_eq!("*".parse::<CorsOrigins>().unwrap(), CorsOrigins::Any);
        assert_eq!(
            "http://localhost:3000, https://app.example.org/"
                .parse::<CorsOrigins>()
                .unwrap(),
            CorsOrigins::List(vec![
                "http://localhost:3000".into(),
                "https://app.example.org".into()
            ])
        );
        assert!(matches!(" , ".parse::<CorsOrigins>(), Err(ConfigError::NoOrigins)));
    }

    #[test]
    fn rejects_unusable_origin() {
        let origins = CorsOrigins::List(vec!["http://bad\norigin".into()]);
        assert!(matches!(origins.layer(), Err(ConfigError::InvalidOrigin { .. })));
    }

    #[test]
    fn parses_connect_mode() {
        assert_eq!("lazy".parse::<ConnectMode>().unwrap(), ConnectMode::Lazy);
        assert_eq!("EAGER".parse::<ConnectMode>().unwrap(), ConnectMode::Eager);
        assert!("sometimes".parse::<ConnectMode>().is_err());
    }
}
