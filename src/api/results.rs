use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::result::ResultResponse;
use crate::services::result_aggregator;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:student_id/:test_id", get(get_result))
}

async fn get_result(
    Path((student_id, test_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
) -> Result<Json<ResultResponse>, ApiError> {
    let result = result_aggregator::get_result(state.db(), student_id, test_id).await?;
    Ok(Json(ResultResponse::from(result)))
}
