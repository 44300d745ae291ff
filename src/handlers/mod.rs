//! HTTP handlers for the students resource.

pub mod student;
pub use student::*;
