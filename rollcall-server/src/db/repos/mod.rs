//! Repository implementations for database access
//!
//! Each repository borrows the pool and maps rows into domain models:
//! - Unique constraints live in the schema; violations become conflicts
//! - Single statement per operation (no transactions)

pub mod courses;
pub mod stats;
pub mod students;

pub use courses::CourseRepo;
pub use stats::StatsRepo;
pub use students::StudentRepo;
