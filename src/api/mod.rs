//! REST API for display producers and the rendering front end
//!
//! Producers push updates (`/api/update`, `/api/message`, ...) and the front
//! end polls `/api/status`. Default port: 5000

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, error, info};

use crate::display::{DisplayController, DisplayState, GenericUpdate, MessageRequest, NO_DATA};
use crate::error::ControllerError;
use crate::prefs::{DisplayPrefs, PrefsStore};
use crate::templates::TemplateStore;

/// Shared state for API handlers
pub struct ApiState {
    /// Owner of the display record
    pub controller: Arc<DisplayController>,
    /// Font sizes and other front-end settings
    pub prefs: Arc<PrefsStore>,
    /// Rendering templates pushed by producers
    pub templates: TemplateStore,
}

/// Acknowledgement carrying the new display state
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub success: bool,
    pub state: DisplayState,
}

impl StateResponse {
    fn ok(state: DisplayState) -> Json<Self> {
        Json(Self {
            success: true,
            state,
        })
    }
}

/// Bare acknowledgement
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: DisplayPrefs,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<FixedOffset>,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }
}

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            ControllerError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", err);
        }
        Self {
            status,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Parse an optional JSON body; empty bodies are `None`
fn parse_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

/// Build the API router
pub fn build_router(state: Arc<ApiState>) -> Router {
    let display_page = ServeFile::new(state.templates.display_page());
    let config_page = ServeFile::new(state.templates.config_page());
    let template_assets = ServeDir::new(state.templates.dir());

    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/update", post(update_display))
        .route("/api/dashboard", get(show_dashboard).post(show_dashboard))
        .route("/api/clear", get(show_dashboard).post(show_dashboard))
        .route("/api/message", post(send_message))
        .route("/api/clear-message", post(clear_message))
        .route("/api/refresh", post(refresh_display))
        .route("/api/template/:name", get(read_template).post(write_template))
        .route("/api/config", get(get_config).post(update_config))
        .route("/health", get(health_check))
        .route_service("/", display_page)
        .route_service("/config", config_page)
        .nest_service("/templates", template_assets)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /api/status - Current display state
async fn get_status(State(state): State<Arc<ApiState>>) -> Json<DisplayState> {
    Json(state.controller.state())
}

/// POST /api/update - Replace the display with producer-shaped content
async fn update_display(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<StateResponse>, ApiError> {
    let update = GenericUpdate::from_body(parse_body(&body)?)?;
    Ok(StateResponse::ok(state.controller.apply_generic_update(update)))
}

/// GET|POST /api/dashboard and /api/clear - Back to the full dashboard
async fn show_dashboard(State(state): State<Arc<ApiState>>) -> Json<Ack> {
    state.controller.reset_to_dashboard();
    Json(Ack { success: true })
}

/// POST /api/message - Typed fullscreen message
async fn send_message(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<StateResponse>, ApiError> {
    let request = MessageRequest::from_body(parse_body(&body)?)?;
    Ok(StateResponse::ok(state.controller.apply_message(request)))
}

/// POST /api/clear-message - Back to the glance view
async fn clear_message(State(state): State<Arc<ApiState>>) -> Json<StateResponse> {
    StateResponse::ok(state.controller.clear_message())
}

/// POST /api/refresh - Keep the screen, bump the timestamp
async fn refresh_display(State(state): State<Arc<ApiState>>) -> Json<StateResponse> {
    StateResponse::ok(state.controller.refresh())
}

/// GET /api/template/:name - Read a stored template
async fn read_template(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let content = state.templates.read(&name).await?;
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], content).into_response())
}

/// POST /api/template/:name - Store a template body (`{"content": "..."}`)
async fn write_template(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<TemplateResponse>, ApiError> {
    let Some(body) = parse_body(&body)? else {
        return Err(ApiError::bad_request(NO_DATA));
    };
    if !body.is_object() {
        return Err(ApiError::bad_request("Template body must be a JSON object"));
    }
    let content = match body.get("content") {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) => text.as_str(),
        Some(_) => return Err(ApiError::bad_request("Template content must be a string")),
    };

    let template = state.templates.write(&name, content).await?;
    Ok(Json(TemplateResponse {
        success: true,
        template,
    }))
}

/// GET /api/config - Display preferences
async fn get_config(State(state): State<Arc<ApiState>>) -> Json<DisplayPrefs> {
    Json(state.prefs.get().await)
}

/// POST /api/config - Merge and persist display preferences
async fn update_config(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<ConfigResponse>, ApiError> {
    let Some(patch) = parse_body(&body)? else {
        return Err(ApiError::bad_request(NO_DATA));
    };
    let config = state.prefs.update(patch).await?;
    Ok(Json(ConfigResponse {
        success: true,
        config,
    }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    debug!("Health check");
    Json(HealthResponse {
        status: "ok",
        time: state.controller.timezone().to_zone(Utc::now()),
    })
}

/// Start the API server, stopping gracefully once `shutdown` resolves
pub async fn start_server(
    state: Arc<ApiState>,
    addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let router = build_router(state);

    info!("Starting display API server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server error")?;

    Ok(())
}
