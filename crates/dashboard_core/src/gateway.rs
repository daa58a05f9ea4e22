//! Remote data gateway: the paged listing, the summary aggregate and the
//! spreadsheet import endpoint.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::protocol::{PageQuery, RecordPage, SummaryStats};
use thiserror::Error;
use tracing::warn;

use crate::upload::SelectedFile;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
}

/// Error body of a rejected upload, discriminated once at the gateway
/// boundary. Text bodies are kept verbatim; interpretation happens in
/// [`crate::upload::ErrorPayload::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Text(String),
    Structured(serde_json::Value),
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRejection {
    pub status: Option<u16>,
    pub body: ErrorBody,
}

impl UploadRejection {
    pub fn new(status: Option<u16>, body: ErrorBody) -> Self {
        Self { status, body }
    }

    /// Request never produced a response (connection refused, reset, ...).
    pub fn transport() -> Self {
        Self::new(None, ErrorBody::Absent)
    }
}

#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<RecordPage, GatewayError>;
    async fn fetch_summary(&self) -> Result<SummaryStats, GatewayError>;
    async fn submit_file(&self, file: SelectedFile) -> Result<(), UploadRejection>;
}

pub struct HttpInventoryGateway {
    http: Client,
    base_url: String,
}

impl HttpInventoryGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::Status(status.as_u16()))
    }
}

#[async_trait]
impl InventoryGateway for HttpInventoryGateway {
    async fn fetch_page(&self, query: &PageQuery) -> Result<RecordPage, GatewayError> {
        let response = self
            .http
            .get(format!("{}/dashboard/products", self.base_url))
            .query(query)
            .send()
            .await?;
        Ok(ensure_success(response)?.json().await?)
    }

    async fn fetch_summary(&self) -> Result<SummaryStats, GatewayError> {
        let response = self
            .http
            .get(format!("{}/dashboard/summary", self.base_url))
            .send()
            .await?;
        Ok(ensure_success(response)?.json().await?)
    }

    async fn submit_file(&self, file: SelectedFile) -> Result<(), UploadRejection> {
        let part = Part::bytes(file.bytes).file_name(file.filename);
        let form = Form::new().part("file", part);

        let response = match self
            .http
            .post(format!("{}/import/excel", self.base_url))
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "upload request did not reach the server");
                return Err(UploadRejection::transport());
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(text) if !text.trim().is_empty() => ErrorBody::Text(text),
            Ok(_) => ErrorBody::Absent,
            Err(error) => {
                warn!(%error, status = status.as_u16(), "failed to read upload error body");
                ErrorBody::Absent
            }
        };
        Err(UploadRejection::new(Some(status.as_u16()), body))
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
