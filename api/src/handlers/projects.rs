use axum::{extract::State, http::StatusCode, Json};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::{NewProject, Project};
use common::numbering;

/// List every project ordered by table number
#[tracing::instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Vec<Project>>>, ErrorResponse> {
    let mut tx = state
        .store
        .begin()
        .await
        .map_err(|e| ErrorResponse::database("error starting transaction", e))?;

    let mut projects = tx
        .find_all_projects()
        .await
        .map_err(|e| ErrorResponse::database("error getting projects from database", e))?;

    tx.commit()
        .await
        .map_err(|e| ErrorResponse::database("error committing transaction", e))?;

    projects.sort_by_key(|p| p.location);
    Ok(Json(SuccessResponse::new(projects)))
}

/// Add a project at the next free table
#[tracing::instrument(skip(state, req))]
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<NewProject>,
) -> Result<(StatusCode, Json<SuccessResponse<Project>>), ErrorResponse> {
    let project = numbering::add_project(state.store.as_ref(), req).await?;

    tracing::info!(
        project_id = %project.id,
        location = project.location,
        group = project.group,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(project))))
}
