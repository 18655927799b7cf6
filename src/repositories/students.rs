use crate::db::models::Student;

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>("SELECT id, group_id, full_name FROM students WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}
