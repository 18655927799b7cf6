use crate::db::models::Answer;

pub(crate) const COLUMNS: &str =
    "id, session_id, question_id, submitted_text, is_correct, created_at";

pub(crate) struct CreateAnswer<'a> {
    pub(crate) session_id: i64,
    pub(crate) question_id: i64,
    pub(crate) submitted_text: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    answer: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (session_id, question_id, submitted_text, is_correct, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}"
    ))
    .bind(answer.session_id)
    .bind(answer.question_id)
    .bind(answer.submitted_text)
    .bind(answer.is_correct)
    .bind(answer.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn count_correct(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE session_id = $1 AND is_correct")
        .bind(session_id)
        .fetch_one(executor)
        .await
}

#[cfg(test)]
pub(crate) async fn list_by_session(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: i64,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE session_id = $1 ORDER BY id"
    ))
    .bind(session_id)
    .fetch_all(executor)
    .await
}
