//! Persisted records.

mod student;
pub use student::{Student, StudentBuilder};
