//! Process-local repository with the same contract as the PostgreSQL one.

use super::{single_result, StudentRepository};
use crate::entity::Student;
use crate::error::AppError;
use crate::sql::QueryStyle;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
struct Rows {
    by_id: BTreeMap<i64, Student>,
    /// Last id handed out; explicit ids above it move it forward.
    last_id: i64,
}

impl Rows {
    fn save(&mut self, mut student: Student) -> Result<Student, AppError> {
        let id = match student.id {
            Some(id) => id,
            None => self
                .last_id
                .checked_add(1)
                .ok_or_else(|| AppError::Query("id space exhausted".into()))?,
        };
        self.last_id = self.last_id.max(id);
        student.id = Some(id);
        self.by_id.insert(id, student.clone());
        Ok(student)
    }
}

#[derive(Default)]
pub struct InMemoryStudentRepository {
    rows: RwLock<Rows>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn save(&self, student: Student) -> Result<Student, AppError> {
        self.rows.write().await.save(student)
    }

    async fn save_all(&self, students: Vec<Student>) -> Result<Vec<Student>, AppError> {
        let mut rows = self.rows.write().await;
        // All or nothing: stage on a copy, publish only when every save succeeded.
        let mut staged = rows.clone();
        let saved = students
            .into_iter()
            .map(|s| staged.save(s))
            .collect::<Result<Vec<_>, _>>()?;
        *rows = staged;
        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        Ok(self.rows.read().await.by_id.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        Ok(self.rows.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows.by_id.values().find(|s| s.email == email).cloned())
    }

    async fn delete(&self, student: &Student) -> Result<(), AppError> {
        if let Some(id) = student.id {
            self.rows.write().await.by_id.remove(&id);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.rows.write().await.by_id.remove(&id);
        Ok(())
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        style: QueryStyle,
    ) -> Result<Student, AppError> {
        tracing::debug!(?style, first_name, last_name, "name lookup (memory)");
        let rows = self.rows.read().await;
        let matches: Vec<Student> = rows
            .by_id
            .values()
            .filter(|s| s.first_name == first_name && s.last_name == last_name)
            .cloned()
            .collect();
        single_result(matches)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
