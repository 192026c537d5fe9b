use timetable::db;

#[tokio::test]
async fn test_connect_and_migrate_creates_the_stores() {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to connect");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE '%_periods' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(tables, vec!["archived_periods", "daily_periods", "template_periods"]);
}
