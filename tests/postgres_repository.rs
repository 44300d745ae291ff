//! PostgreSQL repository contract. Needs a reachable `DATABASE_URL`:
//! `cargo test --test postgres_repository -- --ignored`

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use student_api::{
    connect, AppConfig, AppError, PgStudentRepository, QueryStyle, Student, StudentRepository, StudentTable,
};

static NEXT_SCHEMA: AtomicU32 = AtomicU32::new(0);

/// Each test gets its own schema so tests can run in parallel.
async fn setup() -> (PgStudentRepository, PgPool, String) {
    dotenvy::dotenv().ok();
    let schema = format!(
        "students_test_{}_{}",
        std::process::id(),
        NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
    );
    let mut vars: HashMap<String, String> = std::env::vars().collect();
    vars.insert("STUDENT_SCHEMA".into(), schema.clone());
    let config = AppConfig::from_vars(vars).unwrap();
    let pool = connect(&config).await.unwrap();
    let repo = PgStudentRepository::new(pool.clone(), StudentTable::new(schema.clone()));
    (repo, pool, schema)
}

async fn teardown(pool: &PgPool, schema: &str) {
    sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema))
        .execute(pool)
        .await
        .unwrap();
}

fn fernando() -> Student {
    Student::builder()
        .first_name("Fernando")
        .last_name("Salas")
        .email("fernando@gmail.com")
        .build()
}

fn claudia() -> Student {
    Student::builder()
        .first_name("Claudia")
        .last_name("Ramos")
        .email("claudia@gmail.com")
        .build()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn save_assigns_id() {
    let (repo, pool, schema) = setup().await;

    let saved = repo.save(fernando()).await.unwrap();
    assert!(saved.id.unwrap() > 0);
    assert_eq!(saved.first_name, "Fernando");

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn save_with_id_updates_in_place() {
    let (repo, pool, schema) = setup().await;

    let saved = repo.save(fernando()).await.unwrap();
    let mut changed = saved.clone();
    changed.email = "fernando.updated@gmail.com".into();
    let updated = repo.save(changed).await.unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(repo.find_all().await.unwrap(), vec![updated]);

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn explicit_id_does_not_collide_with_generated_ids() {
    let (repo, pool, schema) = setup().await;

    repo.save(fernando().with_id(1)).await.unwrap();
    let generated = repo.save(claudia()).await.unwrap();
    assert!(generated.id.unwrap() > 1);

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn save_all_then_find_all() {
    let (repo, pool, schema) = setup().await;

    let saved = repo.save_all(vec![fernando(), claudia()]).await.unwrap();
    let all = repo.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    for s in &saved {
        assert!(all.contains(s));
    }

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn find_by_email() {
    let (repo, pool, schema) = setup().await;

    repo.save(fernando().with_id(1)).await.unwrap();
    let found = repo.find_by_email("fernando@gmail.com").await.unwrap().unwrap();
    assert_eq!(found.email, "fernando@gmail.com");
    assert!(repo.find_by_email("nobody@gmail.com").await.unwrap().is_none());

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn delete_then_find_by_id_is_empty() {
    let (repo, pool, schema) = setup().await;

    let saved = repo.save(fernando().with_id(1)).await.unwrap();
    repo.delete(&saved).await.unwrap();
    assert!(repo.find_by_id(1).await.unwrap().is_none());
    repo.delete_by_id(1).await.unwrap();

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn name_lookup_styles_agree() {
    let (repo, pool, schema) = setup().await;

    repo.save(fernando()).await.unwrap();
    repo.save(claudia()).await.unwrap();

    let mut results = Vec::new();
    for style in QueryStyle::ALL {
        results.push(repo.find_by_name("Fernando", "Salas", style).await.unwrap());
    }
    assert_eq!(results[0].first_name, "Fernando");
    assert_eq!(results[0].last_name, "Salas");
    assert!(results.windows(2).all(|w| w[0] == w[1]));

    assert_eq!(repo.find_by_jpql_named_params("Claudia", "Ramos").await.unwrap().email, "claudia@gmail.com");
    assert_eq!(repo.find_by_native_index_params("Claudia", "Ramos").await.unwrap().email, "claudia@gmail.com");

    teardown(&pool, &schema).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn name_lookup_requires_single_match() {
    let (repo, pool, schema) = setup().await;

    let err = repo.find_by_jpql_index_params("Fernando", "Salas").await.unwrap_err();
    assert!(matches!(err, AppError::NoResult));

    repo.save(fernando()).await.unwrap();
    repo.save(fernando()).await.unwrap();
    let err = repo.find_by_native_named_params("Fernando", "Salas").await.unwrap_err();
    assert!(matches!(err, AppError::NonUniqueResult(2)));

    teardown(&pool, &schema).await;
}
