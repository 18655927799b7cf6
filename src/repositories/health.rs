use sqlx::PgPool;

/// Round-trips the pool and reports whether the session table is migrated.
pub(crate) async fn schema_ready(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT to_regclass('public.test_sessions') IS NOT NULL")
        .fetch_one(pool)
        .await
}
