use async_trait::async_trait;
use shared::{
    domain::{FontOrigin, FontResource, JobId},
    protocol::{FontStoreStatus, JobStatusPayload},
};
use thiserror::Error;

/// Failure taxonomy for font store calls. `Unauthorized` invalidates a
/// whole apply cycle; `Transport` is kept apart from application-level
/// failures so callers can report "server unavailable" instead of
/// blaming a specific operation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected server response: {0}")]
    Unexpected(String),
}

/// Outcome of deleting a physical font file.
///
/// `NotFound` is a success variant, not an error: a previous partially
/// completed apply may already have removed the file, and re-issuing
/// the delete must stay a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Outcome of triggering the regeneration job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Started(JobId),
    AlreadyRunning(JobId),
}

impl ApplyOutcome {
    pub fn job_id(self) -> JobId {
        match self {
            ApplyOutcome::Started(job_id) | ApplyOutcome::AlreadyRunning(job_id) => job_id,
        }
    }
}

/// Boundary to the server-side font store. Every call requires an
/// authenticated session and may fail `Unauthorized`.
#[async_trait]
pub trait FontStore: Send + Sync {
    async fn status(&self) -> Result<FontStoreStatus, StoreError>;
    async fn list(
        &self,
        filter: Option<&str>,
        origin: Option<FontOrigin>,
    ) -> Result<Vec<FontResource>, StoreError>;
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<FontResource, StoreError>;
    async fn delete_file(&self, physical_file: &str) -> Result<DeleteOutcome, StoreError>;
    async fn apply_changes(&self) -> Result<ApplyOutcome, StoreError>;
    async fn job_status(&self, job_id: JobId) -> Result<JobStatusPayload, StoreError>;
}
