use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_optional, format_primitive};
use crate::db::models::TestSession;
use crate::db::types::SessionStatus;
use crate::services::question_selector::QuestionView;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateSessionRequest {
    #[validate(range(min = 1, message = "student_id must be positive"))]
    pub(crate) student_id: i64,
    #[validate(range(min = 1, message = "test_id must be positive"))]
    pub(crate) test_id: i64,
}

/// Returned once to the issuing admin; the only response that carries the OTP.
#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionResponse {
    pub(crate) session_id: i64,
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) otp: String,
    pub(crate) expires_at: String,
}

impl From<TestSession> for CreateSessionResponse {
    fn from(session: TestSession) -> Self {
        Self {
            session_id: session.id,
            student_id: session.student_id,
            test_id: session.test_id,
            otp: session.otp,
            expires_at: format_primitive(session.expires_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionStatusResponse {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) status: SessionStatus,
    pub(crate) otp_attempts: i32,
    pub(crate) blocked_until: Option<String>,
    pub(crate) expires_at: String,
    pub(crate) started_at: Option<String>,
    pub(crate) completed_at: Option<String>,
}

impl From<&TestSession> for SessionStatusResponse {
    fn from(session: &TestSession) -> Self {
        Self {
            id: session.id,
            student_id: session.student_id,
            test_id: session.test_id,
            status: session.status,
            otp_attempts: session.otp_attempts,
            blocked_until: format_optional(session.blocked_until),
            expires_at: format_primitive(session.expires_at),
            started_at: format_optional(session.started_at),
            completed_at: format_optional(session.completed_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct VerifyOtpRequest {
    #[validate(length(min = 1, max = 32, message = "otp must be 1-32 characters"))]
    pub(crate) otp: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyOtpResponse {
    pub(crate) verified: bool,
    pub(crate) session: SessionStatusResponse,
}

impl VerifyOtpResponse {
    pub(crate) fn accepted(session: &TestSession) -> Self {
        Self { verified: true, session: SessionStatusResponse::from(session) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionBatchResponse {
    pub(crate) session_id: i64,
    pub(crate) test_id: i64,
    pub(crate) questions: Vec<QuestionView>,
}
