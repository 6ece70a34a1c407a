//! Route modules, one per resource

pub mod courses;
pub mod dashboard;
pub mod health;
pub mod students;

use serde::Serialize;

/// Confirmation body for DELETE
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}
