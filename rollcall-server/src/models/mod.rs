//! Domain models with validation at construction
//!
//! Request bodies deserialize into loose `Create*`/`Update*` types; they are
//! validated into `New*`/`*Patch` values before anything reaches the store.

pub mod course;
pub mod stats;
pub mod student;
pub mod validation;

pub use course::{Course, CoursePatch, CourseStatus, CreateCourse, NewCourse, UpdateCourse};
pub use stats::DashboardStats;
pub use student::{
    CreateStudent, Email, NewStudent, Student, StudentPatch, StudentStatus, UpdateStudent,
};
pub use validation::ValidationError;
