use std::time::Duration;

use sqlx::Row;

fn database_url() -> String {
    // Load .env so POSTGRES_* from .env are available (integration tests don't use app config)
    dotenvy::dotenv().ok();

    for key in ["TEST_DATABASE_URL", "DATABASE_URL"] {
        if let Ok(url) = std::env::var(key) {
            if !url.trim().is_empty() {
                return url;
            }
        }
    }

    // Build from POSTGRES_* (same as app config)
    let server = std::env::var("POSTGRES_SERVER").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
    let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "quizgate".into());
    let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_default();
    let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "quizgate".into());

    format!("postgresql://{user}:{password}@{server}:{port}/{db}")
}

#[tokio::test]
async fn migrations_apply_and_schema_exists() -> anyhow::Result<()> {
    let url = database_url();
    let connect = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(2))
        .connect(&url);

    let pool = match tokio::time::timeout(Duration::from_secs(3), connect).await {
        Ok(Ok(pool)) => pool,
        Ok(Err(err)) => {
            eprintln!("skipping migrations smoke test: {err}");
            return Ok(());
        }
        Err(_) => {
            eprintln!("skipping migrations smoke test: connection timed out");
            return Ok(());
        }
    };

    let migrations_dir =
        std::env::var("QUIZGATE_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables = [
        "groups",
        "students",
        "subjects",
        "topics",
        "tests",
        "test_topics",
        "questions",
        "options",
        "test_sessions",
        "answers",
        "results",
    ];

    for table in tables {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    let live_index: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('ux_test_sessions_live_pair')::text")
            .fetch_one(&pool)
            .await?;
    assert!(live_index.is_some(), "expected partial unique index on live sessions");

    let statuses: Vec<String> = sqlx::query_scalar(
        "SELECT enumlabel::text FROM pg_enum e
         JOIN pg_type t ON t.oid = e.enumtypid
         WHERE t.typname = 'sessionstatus'
         ORDER BY e.enumsortorder",
    )
    .fetch_all(&pool)
    .await?;
    assert_eq!(statuses, vec!["active", "blocked", "expired", "completed"]);

    Ok(())
}
