//! Command implementations for the rollcall CLI

pub mod serve;

pub use serve::run_serve;
