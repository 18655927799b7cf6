use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{TestResult, TestSession};
use crate::db::types::SessionStatus;
use crate::repositories;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::session_manager;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Score {
    pub(crate) correct_count: i32,
    pub(crate) total_count: i32,
    pub(crate) percentage: f64,
}

/// Scores against the fixed batch size, not the number of questions answered:
/// an unfinished batch still counts every unanswered slot as wrong.
pub(crate) fn compute_score(correct_count: i64, batch_size: u32) -> Score {
    let total_count = i32::try_from(batch_size).unwrap_or(i32::MAX);
    let correct_count = i32::try_from(correct_count.max(0)).unwrap_or(i32::MAX);
    let percentage = if total_count > 0 {
        f64::from(correct_count) / f64::from(total_count) * 100.0
    } else {
        0.0
    };

    Score { correct_count, total_count, percentage }
}

pub(crate) fn summary_text(correct_count: i32, total_count: i32, percentage: f64) -> String {
    format!("{correct_count} / {total_count} ({percentage:.1}%)")
}

/// Finishing is allowed from a usable session and, to recompute, from an
/// already completed one.
pub(crate) fn ensure_finishable(session: &TestSession, now: PrimitiveDateTime) -> ServiceResult<()> {
    if session.status == SessionStatus::Completed {
        return Ok(());
    }
    match session_manager::usability_error(session, now) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

pub(crate) async fn finish_session(
    pool: &PgPool,
    session_id: i64,
    batch_size: u32,
) -> ServiceResult<TestResult> {
    finish_session_at(pool, session_id, batch_size, primitive_now_utc()).await
}

pub(crate) async fn finish_session_at(
    pool: &PgPool,
    session_id: i64,
    batch_size: u32,
    now: PrimitiveDateTime,
) -> ServiceResult<TestResult> {
    let mut tx = pool.begin().await?;

    repositories::sessions::find_by_id_for_update(&mut *tx, session_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session", session_id))?;

    let session = repositories::sessions::complete(&mut *tx, session_id, now).await?;
    let correct = repositories::answers::count_correct(&mut *tx, session_id).await?;
    let score = compute_score(correct, batch_size);

    let result = repositories::results::upsert(
        &mut *tx,
        repositories::results::UpsertResult {
            student_id: session.student_id,
            test_id: session.test_id,
            correct_count: score.correct_count,
            total_count: score.total_count,
            percentage: score.percentage,
            now,
        },
    )
    .await?;

    tx.commit().await?;

    metrics::record_session_finished(result.percentage);
    tracing::info!(
        session_id,
        student_id = session.student_id,
        test_id = session.test_id,
        result_id = result.id,
        correct = result.correct_count,
        total = result.total_count,
        percentage = result.percentage,
        "Session finished"
    );

    Ok(result)
}

pub(crate) async fn get_result(
    pool: &PgPool,
    student_id: i64,
    test_id: i64,
) -> ServiceResult<TestResult> {
    match repositories::results::find_by_student_and_test(pool, student_id, test_id).await? {
        Some(result) => Ok(result),
        None => {
            tracing::debug!(student_id, test_id, "No result recorded");
            Err(ServiceError::not_found("Result", test_id))
        }
    }
}

pub(crate) async fn get_session_result(pool: &PgPool, session_id: i64) -> ServiceResult<TestResult> {
    let session = session_manager::get_session(pool, session_id).await?;
    get_result(pool, session.student_id, session.test_id).await
}

pub(crate) async fn list_results(
    pool: &PgPool,
    student_id: Option<i64>,
    test_id: Option<i64>,
    skip: i64,
    limit: i64,
) -> ServiceResult<Vec<TestResult>> {
    Ok(repositories::results::list(pool, student_id, test_id, skip, limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn now() -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::May, 1).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(12, 0, 0).unwrap())
    }

    fn session(status: SessionStatus, started: bool) -> TestSession {
        TestSession {
            id: 5,
            student_id: 1,
            test_id: 2,
            otp: "482913".to_string(),
            status,
            otp_attempts: 0,
            blocked_until: None,
            created_at: now() - Duration::minutes(10),
            expires_at: now() + Duration::minutes(170),
            started_at: started.then(|| now() - Duration::minutes(5)),
            completed_at: None,
        }
    }

    #[test]
    fn one_correct_out_of_twenty_is_five_percent() {
        let score = compute_score(1, 20);
        assert_eq!(score, Score { correct_count: 1, total_count: 20, percentage: 5.0 });
    }

    #[test]
    fn denominator_is_batch_size_even_for_full_marks() {
        assert_eq!(compute_score(20, 20).percentage, 100.0);
        assert_eq!(compute_score(0, 20).percentage, 0.0);
        assert_eq!(compute_score(3, 10).percentage, 30.0);
    }

    #[test]
    fn summary_matches_display_format() {
        assert_eq!(summary_text(1, 20, 5.0), "1 / 20 (5.0%)");
        assert_eq!(summary_text(7, 20, 35.0), "7 / 20 (35.0%)");
    }

    #[test]
    fn completed_sessions_may_be_refinished() {
        assert!(ensure_finishable(&session(SessionStatus::Completed, true), now()).is_ok());
        assert!(ensure_finishable(&session(SessionStatus::Active, true), now()).is_ok());
    }

    #[test]
    fn unverified_or_expired_sessions_cannot_finish() {
        assert!(matches!(
            ensure_finishable(&session(SessionStatus::Active, false), now()),
            Err(ServiceError::AuthenticationFailure(_))
        ));
        assert!(matches!(
            ensure_finishable(&session(SessionStatus::Expired, true), now()),
            Err(ServiceError::Expired(_))
        ));
    }
}
