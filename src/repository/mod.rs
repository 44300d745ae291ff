//! Persistence boundary for students.

mod memory;
mod postgres;

pub use memory::InMemoryStudentRepository;
pub use postgres::PgStudentRepository;

use crate::entity::Student;
use crate::error::AppError;
use crate::sql::QueryStyle;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Insert when `id` is unset, otherwise insert-or-overwrite by id. Returns the stored row.
    async fn save(&self, student: Student) -> Result<Student, AppError>;

    async fn save_all(&self, students: Vec<Student>) -> Result<Vec<Student>, AppError>;

    async fn find_all(&self) -> Result<Vec<Student>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;

    /// Lowest id wins when several rows share an email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;

    /// No-op when the student has no id or is not stored.
    async fn delete(&self, student: &Student) -> Result<(), AppError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;

    /// Exactly one row must match both names, else `NoResult` / `NonUniqueResult`.
    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        style: QueryStyle,
    ) -> Result<Student, AppError>;

    async fn ping(&self) -> Result<(), AppError>;

    async fn find_by_jpql_index_params(&self, first_name: &str, last_name: &str) -> Result<Student, AppError> {
        self.find_by_name(first_name, last_name, QueryStyle::DeclarativeIndexed).await
    }

    async fn find_by_jpql_named_params(&self, first_name: &str, last_name: &str) -> Result<Student, AppError> {
        self.find_by_name(first_name, last_name, QueryStyle::DeclarativeNamed).await
    }

    async fn find_by_native_index_params(&self, first_name: &str, last_name: &str) -> Result<Student, AppError> {
        self.find_by_name(first_name, last_name, QueryStyle::NativeIndexed).await
    }

    async fn find_by_native_named_params(&self, first_name: &str, last_name: &str) -> Result<Student, AppError> {
        self.find_by_name(first_name, last_name, QueryStyle::NativeNamed).await
    }
}

/// Enforce the single-result contract on a lookup's rows.
pub(crate) fn single_result(mut rows: Vec<Student>) -> Result<Student, AppError> {
    match rows.len() {
        0 => Err(AppError::NoResult),
        1 => Ok(rows.remove(0)),
        n => Err(AppError::NonUniqueResult(n)),
    }
}
