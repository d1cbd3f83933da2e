use axum::{extract::State, Json};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::Judge;

/// List every judge with the group they review next
#[tracing::instrument(skip(state))]
pub async fn list_judges(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Vec<Judge>>>, ErrorResponse> {
    let mut tx = state
        .store
        .begin()
        .await
        .map_err(|e| ErrorResponse::database("error starting transaction", e))?;

    let judges = tx
        .find_all_judges()
        .await
        .map_err(|e| ErrorResponse::database("error getting judges from database", e))?;

    tx.commit()
        .await
        .map_err(|e| ErrorResponse::database("error committing transaction", e))?;

    Ok(Json(SuccessResponse::new(judges)))
}
