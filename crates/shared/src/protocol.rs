use serde::{Deserialize, Serialize};

use crate::domain::{JobId, JobStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontStoreStatus {
    pub available: bool,
    pub total_count: u32,
    pub custom_count: u32,
    pub is_generating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job: Option<JobId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusPayload {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyAccepted {
    pub job_id: JobId,
}

/// Body of a 409 on the apply endpoint: a regeneration is already
/// running and this is its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyConflict {
    pub job_id: JobId,
}
