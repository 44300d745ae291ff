//! StudentService: orchestration between HTTP handlers and the repository.

mod student;
pub use student::StudentService;
