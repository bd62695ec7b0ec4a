// SPDX-License-Identifier: GPL-3.0-only
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::links::WorkshopId;

#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Steam API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Workshop item not found: {0}")]
    NotFound(WorkshopId),
}

/// Display details of a workshop item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkshopPreview {
    pub workshop_id: WorkshopId,
    pub title: String,
    pub preview_url: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Deserialize)]
struct DetailsEnvelope {
    response: DetailsResponse,
}

#[derive(Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    publishedfiledetails: Vec<FileDetails>,
}

#[derive(Deserialize)]
struct FileDetails {
    result: i32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    preview_url: Option<String>,
    /// Steam sends this as a string, sometimes as a number
    #[serde(default)]
    file_size: Option<serde_json::Value>,
}

/// Fetches titles and preview images from the Steam Web API
///
/// Purely cosmetic: nothing in the download path depends on it.
pub struct PreviewClient {
    client: Client,
    api_base: String,
}

impl PreviewClient {
    pub fn new(api_base: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("WorkshopDownloader/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into(),
        })
    }

    pub async fn fetch(&self, workshop_id: &WorkshopId) -> Result<WorkshopPreview, PreviewError> {
        let url = format!(
            "{}/ISteamRemoteStorage/GetPublishedFileDetails/v1/",
            self.api_base.trim_end_matches('/')
        );
        info!(%workshop_id, "Fetching workshop preview");

        let response = self
            .client
            .post(&url)
            .form(&[("itemcount", "1"), ("publishedfileids[0]", workshop_id.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PreviewError::Status(response.status()));
        }

        let envelope: DetailsEnvelope = response.json().await?;
        let details = envelope
            .response
            .publishedfiledetails
            .into_iter()
            .next()
            .filter(|d| d.result == 1)
            .ok_or_else(|| PreviewError::NotFound(workshop_id.clone()))?;

        let file_size = details.file_size.and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        });

        Ok(WorkshopPreview {
            workshop_id: workshop_id.clone(),
            title: details.title.unwrap_or_default(),
            preview_url: details.preview_url.filter(|u| !u.is_empty()),
            file_size,
        })
    }
}
