//! PostgreSQL repository. Statements come from the `sql` builder; values are always bound.

use super::{single_result, StudentRepository};
use crate::entity::Student;
use crate::error::AppError;
use crate::sql::{self, QueryBuf, QueryStyle, StudentTable};
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
    table: StudentTable,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool, table: StudentTable) -> Self {
        PgStudentRepository { pool, table }
    }

    async fn save_with(&self, conn: &mut sqlx::PgConnection, student: Student) -> Result<Student, AppError> {
        match student.id {
            None => {
                let q = sql::insert(&self.table);
                tracing::debug!(sql = %q, "query");
                let row = sqlx::query_as::<_, Student>(&q)
                    .bind(&student.first_name)
                    .bind(&student.last_name)
                    .bind(&student.email)
                    .fetch_one(&mut *conn)
                    .await?;
                Ok(row)
            }
            Some(id) => {
                let q = sql::upsert(&self.table);
                tracing::debug!(sql = %q, id, "query");
                let row = sqlx::query_as::<_, Student>(&q)
                    .bind(id)
                    .bind(&student.first_name)
                    .bind(&student.last_name)
                    .bind(&student.email)
                    .fetch_one(&mut *conn)
                    .await?;
                let seq = sql::sync_key_sequence(&self.table);
                tracing::debug!(sql = %seq, "query");
                sqlx::query(&seq).execute(&mut *conn).await?;
                Ok(row)
            }
        }
    }

    async fn fetch_many(&self, q: &QueryBuf) -> Result<Vec<Student>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, Student>(&q.sql);
        for p in &q.params {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn save(&self, student: Student) -> Result<Student, AppError> {
        let mut tx = self.pool.begin().await?;
        let saved = self.save_with(&mut tx, student).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn save_all(&self, students: Vec<Student>) -> Result<Vec<Student>, AppError> {
        let mut out = Vec::with_capacity(students.len());
        let mut tx = self.pool.begin().await?;
        for student in students {
            out.push(self.save_with(&mut tx, student).await?);
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        let q = sql::select_all(&self.table);
        tracing::debug!(sql = %q, "query");
        Ok(sqlx::query_as::<_, Student>(&q).fetch_all(&self.pool).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let q = sql::select_by_id(&self.table);
        tracing::debug!(sql = %q, id, "query");
        Ok(sqlx::query_as::<_, Student>(&q)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let q = sql::select_by_email(&self.table);
        tracing::debug!(sql = %q, email, "query");
        Ok(sqlx::query_as::<_, Student>(&q)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, student: &Student) -> Result<(), AppError> {
        match student.id {
            Some(id) => self.delete_by_id(id).await,
            None => Ok(()),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let q = sql::delete_by_id(&self.table);
        tracing::debug!(sql = %q, id, "query");
        sqlx::query(&q).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        style: QueryStyle,
    ) -> Result<Student, AppError> {
        let q = sql::name_lookup(&self.table, style, first_name, last_name)?;
        single_result(self.fetch_many(&q).await?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
