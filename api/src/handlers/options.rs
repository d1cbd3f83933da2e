use axum::{extract::State, Json};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::{GroupConfig, Options};
use common::numbering;

/// Current options, including the table number counters
#[tracing::instrument(skip(state))]
pub async fn get_options(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Options>>, ErrorResponse> {
    let mut tx = state
        .store
        .begin()
        .await
        .map_err(|e| ErrorResponse::database("error starting transaction", e))?;

    let options = tx
        .get_options()
        .await
        .map_err(|e| ErrorResponse::database("error getting options from database", e))?;

    tx.commit()
        .await
        .map_err(|e| ErrorResponse::database("error committing transaction", e))?;

    Ok(Json(SuccessResponse::new(options)))
}

/// Change the group layout; every project is renumbered to match it
#[tracing::instrument(skip(state))]
pub async fn update_groups(
    State(state): State<AppState>,
    Json(req): Json<GroupConfig>,
) -> Result<Json<SuccessResponse<Options>>, ErrorResponse> {
    let options = numbering::configure_groups(state.store.as_ref(), req).await?;
    Ok(Json(SuccessResponse::new(options)))
}
