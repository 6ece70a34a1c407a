//! rollcall-server: student and course management over HTTP+JSON
//!
//! Course and student CRUD, dashboard counts, and a health check, backed by
//! Postgres through a lazily opened, process-wide connection pool.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{ConfigError, ConnectMode, CorsOrigins, ServerConfig};
pub use http::{build_router, run_server, ServerError};
