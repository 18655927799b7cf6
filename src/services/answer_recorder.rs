use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Answer, TestSession};
use crate::repositories;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::session_manager;

/// Digit-only submissions may name an option by id.
pub(crate) fn option_reference(submitted: &str) -> Option<i64> {
    if submitted.is_empty() || !submitted.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    submitted.parse::<i64>().ok()
}

pub(crate) fn grade(effective_answer: &str, correct_answer: &str) -> bool {
    effective_answer.trim().to_lowercase() == correct_answer.trim().to_lowercase()
}

/// Gates on the session, then grades and stores one answer.
pub(crate) async fn record_answer(
    pool: &PgPool,
    session_id: i64,
    question_id: i64,
    submitted: &str,
) -> ServiceResult<Answer> {
    record_answer_at(pool, session_id, question_id, submitted, primitive_now_utc()).await
}

/// The session row stays locked until the answer is committed, so a
/// concurrent finish either counts this answer or refuses it.
pub(crate) async fn record_answer_at(
    pool: &PgPool,
    session_id: i64,
    question_id: i64,
    submitted: &str,
    now: PrimitiveDateTime,
) -> ServiceResult<Answer> {
    let mut tx = pool.begin().await?;

    let session = repositories::sessions::find_by_id_for_update(&mut *tx, session_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session", session_id))?;

    if let Some(error) = session_manager::usability_error(&session, now) {
        tracing::debug!(session_id, status = session.status.as_str(), "Answer refused");
        return Err(error);
    }

    let answer = insert_graded(&mut tx, &session, question_id, submitted, now).await?;

    tx.commit().await?;

    metrics::record_answer(answer.is_correct);
    tracing::info!(
        session_id,
        question_id,
        answer_id = answer.id,
        is_correct = answer.is_correct,
        "Answer recorded"
    );

    Ok(answer)
}

async fn insert_graded(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session: &TestSession,
    question_id: i64,
    submitted: &str,
    now: PrimitiveDateTime,
) -> ServiceResult<Answer> {
    let question = repositories::questions::find_by_id(&mut **tx, question_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Question", question_id))?;

    if question.test_id != session.test_id {
        return Err(ServiceError::validation(format!(
            "Question {question_id} does not belong to this test"
        )));
    }

    let effective = match option_reference(submitted) {
        Some(option_id) => {
            match repositories::questions::find_option(&mut **tx, question.id, option_id).await? {
                Some(option) => option.text,
                None => submitted.to_string(),
            }
        }
        None => submitted.to_string(),
    };

    let is_correct = grade(&effective, &question.correct_answer);

    let answer = repositories::answers::create(
        &mut **tx,
        repositories::answers::CreateAnswer {
            session_id: session.id,
            question_id: question.id,
            submitted_text: &effective,
            is_correct,
            created_at: now,
        },
    )
    .await?;

    Ok(answer)
}
