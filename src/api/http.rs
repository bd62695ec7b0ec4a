// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::accounts::AccountSummary;
use crate::api::handlers::{ApiHandlers, ApiResponse, ApiResult, DownloadBatchRequest, PickDirectoryResponse};
use crate::api::websocket::stream_events;
use crate::orchestrator::{BatchState, BatchSummary};
use crate::preview::WorkshopPreview;
use crate::settings::Settings;

/// Local API a GUI front end drives the downloader through
pub struct HttpServer {
    handlers: Arc<ApiHandlers>,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(handlers: Arc<ApiHandlers>, addr: SocketAddr) -> Self {
        Self { handlers, addr }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/accounts", get(list_accounts_handler))
            .route("/api/settings", get(get_settings_handler))
            .route("/api/state", get(get_state_handler))
            .route("/api/directory/pick", post(pick_directory_handler))
            .route("/api/downloads", post(download_batch_handler))
            .route("/api/preview/:id", get(get_preview_handler))
            .route("/ws", get(ws_handler))
            .with_state(self.handlers.clone())
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let app = self.router();

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn health_handler() -> Json<ApiResponse<&'static str>> {
    ApiHandlers::health().await
}

async fn list_accounts_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Json<ApiResponse<Vec<AccountSummary>>> {
    handlers.list_accounts()
}

async fn get_settings_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Json<ApiResponse<Settings>> {
    handlers.get_settings().await
}

async fn get_state_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Json<ApiResponse<BatchState>> {
    handlers.get_state()
}

async fn pick_directory_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> ApiResult<PickDirectoryResponse> {
    handlers.pick_directory().await
}

async fn download_batch_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Json(request): Json<DownloadBatchRequest>,
) -> Result<Json<ApiResponse<BatchSummary>>, StatusCode> {
    handlers.download_batch(request).await
}

async fn get_preview_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(id): Path<String>,
) -> ApiResult<WorkshopPreview> {
    handlers.get_preview(&id).await
}

async fn ws_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    ws: WebSocketUpgrade,
) -> Response {
    let events = handlers.orchestrator().events().subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, events))
}
