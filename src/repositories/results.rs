use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::TestResult;

pub(crate) const COLUMNS: &str = "\
    id, student_id, test_id, correct_count, total_count, percentage, created_at, updated_at";

pub(crate) struct UpsertResult {
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) correct_count: i32,
    pub(crate) total_count: i32,
    pub(crate) percentage: f64,
    pub(crate) now: time::PrimitiveDateTime,
}

/// One row per (student, test); a later finish overwrites the scores.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    result: UpsertResult,
) -> Result<TestResult, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "INSERT INTO results (
            student_id, test_id, correct_count, total_count, percentage, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$6)
        ON CONFLICT (student_id, test_id) DO UPDATE
        SET correct_count = EXCLUDED.correct_count,
            total_count = EXCLUDED.total_count,
            percentage = EXCLUDED.percentage,
            updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}"
    ))
    .bind(result.student_id)
    .bind(result.test_id)
    .bind(result.correct_count)
    .bind(result.total_count)
    .bind(result.percentage)
    .bind(result.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_student_and_test(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: i64,
    test_id: i64,
) -> Result<Option<TestResult>, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "SELECT {COLUMNS} FROM results WHERE student_id = $1 AND test_id = $2"
    ))
    .bind(student_id)
    .bind(test_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    student_id: Option<i64>,
    test_id: Option<i64>,
    skip: i64,
    limit: i64,
) -> Result<Vec<TestResult>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM results WHERE TRUE"));

    if let Some(student_id) = student_id {
        builder.push(" AND student_id = ");
        builder.push_bind(student_id);
    }

    if let Some(test_id) = test_id {
        builder.push(" AND test_id = ");
        builder.push_bind(test_id);
    }

    builder.push(" ORDER BY updated_at DESC, id DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<TestResult>().fetch_all(pool).await
}
