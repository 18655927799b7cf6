use crate::db::models::TestSession;
use crate::db::types::SessionStatus;

pub(crate) const COLUMNS: &str = "\
    id, student_id, test_id, otp, status, otp_attempts, blocked_until, \
    created_at, expires_at, started_at, completed_at";

pub(crate) struct CreateSession<'a> {
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) otp: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) expires_at: time::PrimitiveDateTime,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<TestSession>, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!("SELECT {COLUMNS} FROM test_sessions WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row-locks the session until the surrounding transaction ends.
pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<TestSession>, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!(
        "SELECT {COLUMNS} FROM test_sessions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Serializes session issuance for one (student, test) pair within a transaction.
pub(crate) async fn acquire_pair_lock(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: i64,
    test_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("test_session:{student_id}:{test_id}"))
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn expire_live_for_pair(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: i64,
    test_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE test_sessions SET status = $1 \
         WHERE student_id = $2 AND test_id = $3 AND status IN ($4, $5)",
    )
    .bind(SessionStatus::Expired)
    .bind(student_id)
    .bind(test_id)
    .bind(SessionStatus::Active)
    .bind(SessionStatus::Blocked)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    session: CreateSession<'_>,
) -> Result<TestSession, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!(
        "INSERT INTO test_sessions (
            student_id, test_id, otp, status, otp_attempts, created_at, expires_at
        ) VALUES ($1,$2,$3,$4,0,$5,$6)
        RETURNING {COLUMNS}"
    ))
    .bind(session.student_id)
    .bind(session.test_id)
    .bind(session.otp)
    .bind(SessionStatus::Active)
    .bind(session.created_at)
    .bind(session.expires_at)
    .fetch_one(executor)
    .await
}

/// Writes back the fields the OTP state machine owns.
pub(crate) async fn save_verification_state(
    executor: impl sqlx::PgExecutor<'_>,
    session: &TestSession,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE test_sessions \
         SET status = $1, otp_attempts = $2, blocked_until = $3, started_at = $4 \
         WHERE id = $5",
    )
    .bind(session.status)
    .bind(session.otp_attempts)
    .bind(session.blocked_until)
    .bind(session.started_at)
    .bind(session.id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn complete(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    now: time::PrimitiveDateTime,
) -> Result<TestSession, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!(
        "UPDATE test_sessions SET status = $1, completed_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(SessionStatus::Completed)
    .bind(now)
    .bind(id)
    .fetch_one(executor)
    .await
}
