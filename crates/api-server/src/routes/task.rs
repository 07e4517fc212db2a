//! Task record endpoints
//!
//! The owner-scoped record store surface the task mirror writes through.
//! Every route derives the owner from the bearer token; a record belonging
//! to someone else is indistinguishable from a missing one.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use tasko_core::task::{Task, TaskDraft, TaskPatch, TaskRepository};
use tasko_core::Error;

use crate::state::AppState;

use super::{authorize, internal_error, route_error, RouteError};

fn core_error(err: Error) -> RouteError {
    match err {
        Error::TaskNotFound(id) => {
            route_error(StatusCode::NOT_FOUND, format!("Task {} not found", id))
        }
        Error::InvalidInput(msg) => route_error(StatusCode::BAD_REQUEST, msg),
        other => internal_error(other),
    }
}

async fn ensure_owned(state: &AppState, owner_id: Uuid, id: Uuid) -> Result<(), RouteError> {
    let owned = state
        .task_store()
        .select(owner_id)
        .await
        .map_err(core_error)?;
    if owned.iter().any(|task| task.id == id) {
        Ok(())
    } else {
        Err(route_error(
            StatusCode::NOT_FOUND,
            format!("Task {} not found", id),
        ))
    }
}

/// GET /api/tasks - Every task belonging to the authenticated owner
async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, RouteError> {
    let session = authorize(&state, &headers).await?;
    let tasks = state
        .task_store()
        .select(session.user.id)
        .await
        .map_err(core_error)?;
    Ok(Json(tasks))
}

/// POST /api/tasks - Insert a task and return the authoritative record
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), RouteError> {
    let session = authorize(&state, &headers).await?;

    if draft.title.trim().is_empty() {
        return Err(route_error(
            StatusCode::BAD_REQUEST,
            "Title cannot be empty",
        ));
    }

    let created = state
        .task_store()
        .insert(session.user.id, draft)
        .await
        .map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/tasks/{id} - Apply a partial update
///
/// The body is a JSON object holding only the fields to change; a null
/// clears an optional field, a missing key leaves it untouched.
async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Task>, RouteError> {
    let session = authorize(&state, &headers).await?;

    let fields = body
        .as_object()
        .ok_or_else(|| route_error(StatusCode::BAD_REQUEST, "Patch body must be an object"))?;
    let patch = TaskPatch::from_json(fields).map_err(core_error)?;
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(route_error(
                StatusCode::BAD_REQUEST,
                "Title cannot be empty",
            ));
        }
    }

    ensure_owned(&state, session.user.id, id).await?;
    state
        .task_store()
        .update(id, &patch)
        .await
        .map_err(core_error)?;

    let tasks = state
        .task_store()
        .select(session.user.id)
        .await
        .map_err(core_error)?;
    tasks
        .into_iter()
        .find(|task| task.id == id)
        .map(Json)
        .ok_or_else(|| route_error(StatusCode::NOT_FOUND, format!("Task {} not found", id)))
}

/// DELETE /api/tasks/{id} - Hard-delete a record
async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    let session = authorize(&state, &headers).await?;

    ensure_owned(&state, session.user.id, id).await?;
    state.task_store().delete(id).await.map_err(core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            axum::routing::patch(update_task).delete(delete_task),
        )
}
