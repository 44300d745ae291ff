use crate::entity::Student;
use crate::error::AppError;
use crate::repository::StudentRepository;
use std::sync::Arc;

/// Each operation is a single repository call; no validation or retries are added.
#[derive(Clone)]
pub struct StudentService {
    repository: Arc<dyn StudentRepository>,
}

impl StudentService {
    pub fn new(repository: Arc<dyn StudentRepository>) -> Self {
        StudentService { repository }
    }

    pub fn repository(&self) -> &Arc<dyn StudentRepository> {
        &self.repository
    }

    pub async fn save_student(&self, student: Student) -> Result<Student, AppError> {
        self.repository.save(student).await
    }

    pub async fn get_all_students(&self) -> Result<Vec<Student>, AppError> {
        self.repository.find_all().await
    }

    pub async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        self.repository.find_by_id(id).await
    }

    /// Same as [`save_student`](Self::save_student); the id present on `student` selects the row.
    pub async fn update_student(&self, student: Student) -> Result<Student, AppError> {
        self.repository.save(student).await
    }

    pub async fn delete_student(&self, id: i64) -> Result<(), AppError> {
        self.repository.delete_by_id(id).await
    }
}
