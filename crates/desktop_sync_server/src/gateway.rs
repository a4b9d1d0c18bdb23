//! HTTP command gateway.
//!
//! Handlers translate requests into [`RegistryCommand`]s and return `202 Accepted` with a
//! [`CommandAck`]. Clients observe the effect through the next pushed snapshot, not through the
//! response body.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use desktop_sync_contract::{
    routes, CommandAck, CreateWindowRequest, FileEntry, SetThemeRequest, SnapshotMessage,
    WindowId, WindowPatch, CORRELATION_ID_HEADER,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::{
    reducer::{RegistryCommand, RegistryError},
    registry::WindowRegistry,
    sync_channel,
};

/// Errors returned to gateway callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request body could not be decoded.
    #[error(transparent)]
    Body(#[from] JsonRejection),
    /// The registry refused the command.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Body(rejection) => rejection.status(),
            Self::Registry(RegistryError::InvalidPatch(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Registry(RegistryError::NoWindow) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = status.as_u16(), error = %self, "rejected command");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type Accepted = (StatusCode, Json<CommandAck>);

/// Builds the gateway and push-channel routes over a shared registry.
pub fn router(registry: Arc<WindowRegistry>) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health))
        .route(routes::STATE, get(get_state))
        .route(routes::WINDOWS, post(create_window))
        .route(
            "/api/windows/:id",
            put(update_window).patch(update_window).delete(close_window),
        )
        .route("/api/windows/:id/focus", post(focus_window))
        .route(routes::THEME, put(set_theme))
        .route(routes::FILES, get(list_files).post(add_file))
        .route(routes::SYNC, get(sync_channel::handle_websocket))
        .with_state(registry)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_state(State(registry): State<Arc<WindowRegistry>>) -> Json<SnapshotMessage> {
    Json(registry.snapshot())
}

async fn create_window(
    State(registry): State<Arc<WindowRegistry>>,
    headers: HeaderMap,
    body: Result<Json<CreateWindowRequest>, JsonRejection>,
) -> Result<Accepted, GatewayError> {
    let Json(request) = body?;
    submit(&registry, &headers, RegistryCommand::CreateWindow(request))
}

async fn update_window(
    State(registry): State<Arc<WindowRegistry>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<WindowPatch>, JsonRejection>,
) -> Result<Accepted, GatewayError> {
    let Json(patch) = body?;
    let command = RegistryCommand::UpdateWindow {
        window_id: WindowId::new(id),
        patch,
    };
    submit(&registry, &headers, command)
}

async fn close_window(
    State(registry): State<Arc<WindowRegistry>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Accepted, GatewayError> {
    let command = RegistryCommand::CloseWindow {
        window_id: WindowId::new(id),
    };
    submit(&registry, &headers, command)
}

async fn focus_window(
    State(registry): State<Arc<WindowRegistry>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Accepted, GatewayError> {
    let command = RegistryCommand::FocusWindow {
        window_id: WindowId::new(id),
    };
    submit(&registry, &headers, command)
}

async fn set_theme(
    State(registry): State<Arc<WindowRegistry>>,
    headers: HeaderMap,
    body: Result<Json<SetThemeRequest>, JsonRejection>,
) -> Result<Accepted, GatewayError> {
    let Json(SetThemeRequest { theme }) = body?;
    submit(&registry, &headers, RegistryCommand::SetTheme { theme })
}

async fn list_files(State(registry): State<Arc<WindowRegistry>>) -> Json<Vec<FileEntry>> {
    Json(registry.files())
}

async fn add_file(
    State(registry): State<Arc<WindowRegistry>>,
    headers: HeaderMap,
    body: Result<Json<FileEntry>, JsonRejection>,
) -> Result<Accepted, GatewayError> {
    let Json(file) = body?;
    submit(&registry, &headers, RegistryCommand::AddFile(file))
}

fn submit(
    registry: &WindowRegistry,
    headers: &HeaderMap,
    command: RegistryCommand,
) -> Result<Accepted, GatewayError> {
    let ack = registry.submit(command, correlation_id(headers))?;
    Ok((StatusCode::ACCEPTED, Json(ack)))
}

fn correlation_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
