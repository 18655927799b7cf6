use crate::db::models::Test;

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(
        "SELECT id, subject_id, name, duration_minutes, is_active FROM tests WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn topic_ids(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT topic_id FROM test_topics WHERE test_id = $1 ORDER BY topic_id")
        .bind(test_id)
        .fetch_all(executor)
        .await
}
