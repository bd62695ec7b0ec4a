// SPDX-License-Identifier: GPL-3.0-only
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::accounts::{AccountBook, AccountSummary};
use crate::links::WorkshopId;
use crate::orchestrator::{BatchError, BatchState, BatchSummary, DownloadOrchestrator};
use crate::picker::{choose_directory, DirectoryPicker};
use crate::preview::{PreviewClient, PreviewError, WorkshopPreview};
use crate::settings::{Settings, SettingsStore};

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadBatchRequest {
    /// Display name or username of the account to use
    pub account: String,

    /// Newline-separated workshop links or IDs
    pub links: String,

    /// Overrides the remembered save location for this batch
    #[serde(default)]
    pub save_path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PickDirectoryResponse {
    pub path: Option<PathBuf>,
    pub cancelled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, StatusCode>;

pub struct ApiHandlers {
    orchestrator: Arc<DownloadOrchestrator>,
    accounts: Arc<AccountBook>,
    settings: Arc<dyn SettingsStore>,
    picker: Arc<dyn DirectoryPicker>,
    preview: Arc<PreviewClient>,
}

impl ApiHandlers {
    pub fn new(
        orchestrator: Arc<DownloadOrchestrator>,
        accounts: Arc<AccountBook>,
        settings: Arc<dyn SettingsStore>,
        picker: Arc<dyn DirectoryPicker>,
        preview: Arc<PreviewClient>,
    ) -> Self {
        Self {
            orchestrator,
            accounts,
            settings,
            picker,
            preview,
        }
    }

    pub fn orchestrator(&self) -> &Arc<DownloadOrchestrator> {
        &self.orchestrator
    }

    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub fn list_accounts(&self) -> Json<ApiResponse<Vec<AccountSummary>>> {
        Json(ApiResponse::success(self.accounts.summaries()))
    }

    pub async fn get_settings(&self) -> Json<ApiResponse<Settings>> {
        Json(ApiResponse::success(self.settings.load().await))
    }

    pub fn get_state(&self) -> Json<ApiResponse<BatchState>> {
        Json(ApiResponse::success(self.orchestrator.state()))
    }

    pub async fn pick_directory(&self) -> ApiResult<PickDirectoryResponse> {
        match choose_directory(self.picker.as_ref(), self.settings.as_ref()).await {
            Ok(path) => {
                let cancelled = path.is_none();
                Ok(Json(ApiResponse::success(PickDirectoryResponse { path, cancelled })))
            }
            Err(e) => {
                error!(error = %e, "Failed to save selected directory");
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    pub async fn download_batch(&self, request: DownloadBatchRequest) -> ApiResult<BatchSummary> {
        let Some(account) = self.accounts.find(&request.account) else {
            warn!(account = %request.account, "Download requested with unknown account");
            return Err(StatusCode::NOT_FOUND);
        };
        info!(account = %account.label(), "Download batch request received");

        // Detached so a client disconnect cannot cancel the batch halfway
        let orchestrator = self.orchestrator.clone();
        let account = account.clone();
        let batch = tokio::spawn(async move {
            orchestrator
                .run_batch(&request.links, &account, request.save_path)
                .await
        });

        let result = match batch.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Download batch task failed");
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        match result {
            Ok(summary) => Ok(Json(ApiResponse::success(summary))),
            Err(BatchError::AlreadyRunning) => Err(StatusCode::CONFLICT),
            Err(BatchError::NoSaveLocation | BatchError::NoLinks) => Err(StatusCode::BAD_REQUEST),
        }
    }

    pub async fn get_preview(&self, id: &str) -> ApiResult<WorkshopPreview> {
        let Some(workshop_id) = WorkshopId::parse(id) else {
            return Err(StatusCode::BAD_REQUEST);
        };

        match self.preview.fetch(&workshop_id).await {
            Ok(preview) => Ok(Json(ApiResponse::success(preview))),
            Err(PreviewError::NotFound(_)) => Err(StatusCode::NOT_FOUND),
            Err(e) => {
                warn!(error = %e, %workshop_id, "Failed to fetch preview");
                Err(StatusCode::BAD_GATEWAY)
            }
        }
    }
}
