//! Student API: CRUD REST backend for student records with PostgreSQL.

pub mod app;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use app::{build_app, build_repository, build_state, API_PATH};
pub use config::{AppConfig, StoreKind};
pub use entity::{Student, StudentBuilder};
pub use error::{AppError, ConfigError};
pub use repository::{InMemoryStudentRepository, PgStudentRepository, StudentRepository};
pub use routes::{common_routes_with_ready, student_routes};
pub use service::StudentService;
pub use sql::{QueryStyle, StudentTable};
pub use state::AppState;
pub use store::{connect, ensure_database_exists, ensure_students_table};
