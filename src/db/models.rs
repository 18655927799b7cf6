use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::SessionStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Student {
    pub(crate) id: i64,
    pub(crate) group_id: i64,
    pub(crate) full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Test {
    pub(crate) id: i64,
    pub(crate) subject_id: i64,
    pub(crate) name: String,
    pub(crate) duration_minutes: i32,
    pub(crate) is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) test_id: i64,
    pub(crate) topic_id: i64,
    pub(crate) text: String,
    pub(crate) correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestSession {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) otp: String,
    pub(crate) status: SessionStatus,
    pub(crate) otp_attempts: i32,
    pub(crate) blocked_until: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) started_at: Option<PrimitiveDateTime>,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: i64,
    pub(crate) session_id: i64,
    pub(crate) question_id: i64,
    pub(crate) submitted_text: String,
    pub(crate) is_correct: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestResult {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) correct_count: i32,
    pub(crate) total_count: i32,
    pub(crate) percentage: f64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
