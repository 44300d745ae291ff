//! Router assembly and server startup.

use crate::config::{AppConfig, StoreKind};
use crate::repository::{InMemoryStudentRepository, PgStudentRepository, StudentRepository};
use crate::routes::{common_routes_with_ready, student_routes};
use crate::service::StudentService;
use crate::sql::StudentTable;
use crate::state::AppState;
use crate::store;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub const API_PATH: &str = "/api/students";

/// Common routes plus the students API under [`API_PATH`].
pub fn build_app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest(API_PATH, student_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit_bytes)),
        )
}

/// Repository selected by `config.store`. PostgreSQL is bootstrapped before use.
pub async fn build_repository(config: &AppConfig) -> Result<Arc<dyn StudentRepository>, crate::AppError> {
    Ok(match config.store {
        StoreKind::Postgres => {
            let pool = store::connect(config).await?;
            Arc::new(PgStudentRepository::new(pool, StudentTable::new(config.schema.clone())))
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store; data is lost on exit");
            Arc::new(InMemoryStudentRepository::new())
        }
    })
}

pub async fn build_state(config: &AppConfig) -> Result<AppState, crate::AppError> {
    let repository = build_repository(config).await?;
    Ok(AppState::new(StudentService::new(repository)))
}
