use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shared::{
    domain::{FontOrigin, FontResource, JobId},
    error::ApiError,
    protocol::{ApplyAccepted, ApplyConflict, FontStoreStatus, JobStatusPayload},
};
use tracing::warn;

use crate::store::{ApplyOutcome, DeleteOutcome, FontStore, StoreError};

/// [`FontStore`] backed by the console's REST API. The session must
/// already be authenticated; this client only carries the token.
#[derive(Clone)]
pub struct HttpFontStore {
    http: Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpFontStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Maps a non-2xx response to the error taxonomy, preserving the
    /// server's message when the body parses as an [`ApiError`].
    async fn fail(response: Response) -> StoreError {
        let status = response.status();
        let message = match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiError>(&body) {
                Ok(api) => api.message,
                Err(_) if body.trim().is_empty() => status.to_string(),
                Err(_) => body,
            },
            Err(err) => {
                warn!(%status, %err, "fonts: failed to read error body");
                status.to_string()
            }
        };
        match status {
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::FORBIDDEN => StoreError::Forbidden(message),
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            StatusCode::CONFLICT => StoreError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Validation(message)
            }
            _ => StoreError::Unexpected(format!("{status}: {message}")),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Unexpected(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

fn origin_param(origin: FontOrigin) -> &'static str {
    match origin {
        FontOrigin::Builtin => "builtin",
        FontOrigin::Custom => "custom",
    }
}

#[async_trait]
impl FontStore for HttpFontStore {
    async fn status(&self) -> Result<FontStoreStatus, StoreError> {
        let response = self
            .authorized(self.http.get(format!("{}/api/fonts/status", self.base_url)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    async fn list(
        &self,
        filter: Option<&str>,
        origin: Option<FontOrigin>,
    ) -> Result<Vec<FontResource>, StoreError> {
        let mut request = self
            .authorized(self.http.get(format!("{}/api/fonts", self.base_url)));
        if let Some(filter) = filter {
            request = request.query(&[("filter", filter)]);
        }
        if let Some(origin) = origin {
            request = request.query(&[("origin", origin_param(origin))]);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<FontResource, StoreError> {
        let response = self
            .authorized(self.http.post(format!("{}/api/fonts/upload", self.base_url)))
            .query(&[("file_name", file_name)])
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete_file(&self, physical_file: &str) -> Result<DeleteOutcome, StoreError> {
        let response = self
            .authorized(self.http.delete(format!("{}/api/fonts/files", self.base_url)))
            .query(&[("file", physical_file)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(DeleteOutcome::Deleted)
    }

    async fn apply_changes(&self) -> Result<ApplyOutcome, StoreError> {
        let response = self
            .authorized(self.http.post(format!("{}/api/fonts/apply", self.base_url)))
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            // A regeneration is already running; the body names it so
            // the caller can adopt it instead of failing.
            let body = response.text().await?;
            return match serde_json::from_str::<ApplyConflict>(&body) {
                Ok(conflict) => Ok(ApplyOutcome::AlreadyRunning(conflict.job_id)),
                Err(_) => Err(StoreError::Unexpected(format!(
                    "conflict response without a job id: {body}"
                ))),
            };
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let accepted: ApplyAccepted = response.json().await?;
        Ok(ApplyOutcome::Started(accepted.job_id))
    }

    async fn job_status(&self, job_id: JobId) -> Result<JobStatusPayload, StoreError> {
        let response = self
            .authorized(
                self.http
                    .get(format!("{}/api/fonts/jobs/{}", self.base_url, job_id.0)),
            )
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/http_store_tests.rs"]
mod tests;
