// Admin endpoints for table renumbering and judge group rotation

use axum::{extract::State, Json};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::numbering;

/// Renumber every project 0..n-1 in current table order
#[tracing::instrument(skip(state))]
pub async fn reassign_in_order(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<&'static str>>, ErrorResponse> {
    numbering::reassign_nums_in_order(state.store.as_ref()).await?;
    Ok(Json(SuccessResponse::new("Projects renumbered in order")))
}

/// Renumber every project into the configured groups
#[tracing::instrument(skip(state))]
pub async fn reassign_by_group(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<&'static str>>, ErrorResponse> {
    numbering::reassign_nums_by_group(state.store.as_ref()).await?;
    Ok(Json(SuccessResponse::new("Projects renumbered by group")))
}

/// Move every judge on to the next group
#[tracing::instrument(skip(state))]
pub async fn rotate_judge_groups(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<&'static str>>, ErrorResponse> {
    numbering::increment_judge_group_num(state.store.as_ref()).await?;
    Ok(Json(SuccessResponse::new("Judge groups rotated")))
}
