use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::AdminAccess;
use crate::core::state::AppState;
use crate::schemas::result::{ListResultsQuery, ResultResponse};
use crate::schemas::session::{CreateSessionRequest, CreateSessionResponse};
use crate::services::{result_aggregator, session_manager};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/sessions", post(create_session)).route("/results", get(list_results))
}

async fn create_session(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let session = session_manager::create_session(
        state.db(),
        state.policy(),
        payload.student_id,
        payload.test_id,
    )
    .await?;

    Ok(Json(CreateSessionResponse::from(session)))
}

async fn list_results(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(params): Query<ListResultsQuery>,
) -> Result<Json<Vec<ResultResponse>>, ApiError> {
    let results = result_aggregator::list_results(
        state.db(),
        params.student_id,
        params.test_id,
        params.skip,
        params.limit,
    )
    .await?;

    Ok(Json(results.into_iter().map(ResultResponse::from).collect()))
}
