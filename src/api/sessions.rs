use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::answer::{SubmitAnswerRequest, SubmitAnswerResponse};
use crate::schemas::result::ResultResponse;
use crate::schemas::session::{
    QuestionBatchResponse, SessionStatusResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::services::errors::ServiceError;
use crate::services::session_manager::{self, OtpVerdict};
use crate::services::{answer_recorder, question_selector, result_aggregator};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:session_id", get(get_session_status))
        .route("/:session_id/verify-otp", post(verify_otp))
        .route("/:session_id/questions", get(get_questions))
        .route("/:session_id/answers", post(submit_answer))
        .route("/:session_id/finish", post(finish_session))
        .route("/:session_id/result", get(get_session_result))
}

async fn get_session_status(
    Path(session_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = session_manager::get_session(state.db(), session_id).await?;
    Ok(Json(SessionStatusResponse::from(&session)))
}

async fn verify_otp(
    Path(session_id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (verdict, session) =
        session_manager::verify_otp(state.db(), state.policy(), session_id, &payload.otp).await?;

    match verdict {
        OtpVerdict::Accepted => Ok(Json(VerifyOtpResponse::accepted(&session))),
        OtpVerdict::Mismatch { attempts_remaining } => Err(ApiError::Unauthorized(format!(
            "Invalid OTP, {attempts_remaining} attempt(s) remaining"
        ))),
        OtpVerdict::Blocked { blocked_until } => {
            Err(ServiceError::RateLimited { blocked_until }.into())
        }
        OtpVerdict::Expired => Err(ApiError::Gone("Session has expired".to_string())),
        OtpVerdict::Closed => {
            Err(ApiError::UnprocessableEntity("Session is already completed".to_string()))
        }
    }
}

async fn get_questions(
    Path(session_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<QuestionBatchResponse>, ApiError> {
    let session =
        session_manager::require_usable_session(state.db(), session_id, primitive_now_utc())
            .await?;

    let questions =
        question_selector::select_questions(state.db(), session.test_id, state.batch_size())
            .await?;

    Ok(Json(QuestionBatchResponse { session_id: session.id, test_id: session.test_id, questions }))
}

async fn submit_answer(
    Path(session_id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let answer =
        answer_recorder::record_answer(state.db(), session_id, payload.question_id, &payload.answer)
            .await?;

    Ok(Json(SubmitAnswerResponse::from(answer)))
}

async fn finish_session(
    Path(session_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ResultResponse>, ApiError> {
    let session = session_manager::get_session(state.db(), session_id).await?;
    result_aggregator::ensure_finishable(&session, primitive_now_utc())?;

    let result =
        result_aggregator::finish_session(state.db(), session_id, state.batch_size()).await?;

    Ok(Json(ResultResponse::from(result)))
}

async fn get_session_result(
    Path(session_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ResultResponse>, ApiError> {
    let result = result_aggregator::get_session_result(state.db(), session_id).await?;
    Ok(Json(ResultResponse::from(result)))
}
