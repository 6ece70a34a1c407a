//! Database layer - connection manager, repositories, and the store seam
//!
//! # Design Principles
//!
//! - One memoized pool per process, opened on first use
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Handlers only see [`Store`]; Postgres details stay in `repos`

pub mod connection;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod migrations;
pub mod repos;
pub mod store;

pub use connection::{ConnectionManager, ConnectionState, Connector, PgConnector};
pub use error::DbError;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use store::{PgStore, Store};
