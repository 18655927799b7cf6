use crate::db::models::{Question, QuestionOption};

pub(crate) const COLUMNS: &str = "id, test_id, topic_id, text, correct_answer";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Questions of `test_id` whose topic is one of `topic_ids`.
pub(crate) async fn list_pool(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: i64,
    topic_ids: &[i64],
) -> Result<Vec<Question>, sqlx::Error> {
    if topic_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions \
         WHERE test_id = $1 AND topic_id = ANY($2) \
         ORDER BY id"
    ))
    .bind(test_id)
    .bind(topic_ids)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_options(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[i64],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(
        "SELECT id, question_id, text FROM options WHERE question_id = ANY($1) ORDER BY id",
    )
    .bind(question_ids)
    .fetch_all(executor)
    .await
}

pub(crate) async fn find_option(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
    option_id: i64,
) -> Result<Option<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(
        "SELECT id, question_id, text FROM options WHERE id = $1 AND question_id = $2",
    )
    .bind(option_id)
    .bind(question_id)
    .fetch_optional(executor)
    .await
}
