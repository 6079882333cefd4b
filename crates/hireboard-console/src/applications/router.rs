use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;

use super::backend::{
    ApplicationsBackend, BackendError, BulkStatusRequest, ListQuery, StatusUpdateRequest,
};
use super::domain::ApplicationId;
use super::http::APPLICATIONS_PATH;

/// Router exposing an [`ApplicationsBackend`] over the employer applications API.
pub fn application_router<B>(backend: Arc<B>) -> Router
where
    B: ApplicationsBackend + 'static,
{
    Router::new()
        .route(APPLICATIONS_PATH, get(list_handler::<B>))
        .route(
            "/api/v1/employer/applications/bulk-status",
            post(bulk_status_handler::<B>),
        )
        .route(
            "/api/v1/employer/applications/:application_id/status",
            patch(status_handler::<B>),
        )
        .with_state(backend)
}

pub(crate) async fn list_handler<B>(
    State(backend): State<Arc<B>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    B: ApplicationsBackend + 'static,
{
    match backend.list(&query).await {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<B>(
    State(backend): State<Arc<B>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    B: ApplicationsBackend + 'static,
{
    let id = ApplicationId(application_id);
    match backend.update_status(&id, request.status).await {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bulk_status_handler<B>(
    State(backend): State<Arc<B>>,
    axum::Json(request): axum::Json<BulkStatusRequest>,
) -> Response
where
    B: ApplicationsBackend + 'static,
{
    match backend
        .bulk_update_status(&request.ids, request.status)
        .await
    {
        Ok(ack) => (StatusCode::OK, axum::Json(ack)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: BackendError) -> Response {
    let status = match &error {
        BackendError::Rejected(_) => StatusCode::BAD_REQUEST,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Transport(_) | BackendError::Status { .. } | BackendError::Malformed(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
