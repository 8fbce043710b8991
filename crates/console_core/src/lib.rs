use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::join_all;
use shared::{
    domain::{FontResource, JobId, JobStatus},
    protocol::{FontStoreStatus, JobStatusPayload},
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex, RwLock},
    task::JoinHandle,
};
use tracing::{info, warn};

pub mod catalog;
pub mod http_store;
pub mod pending;
pub mod store;

pub use catalog::FontCatalog;
pub use http_store::HttpFontStore;
pub use pending::{PendingChangeSet, PendingFontFile, ACCEPTED_FONT_SUFFIXES};
pub use store::{ApplyOutcome, DeleteOutcome, FontStore, StoreError};

const JOB_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// What the user is being asked to approve before an apply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationRequest {
    ApplyPending { additions: usize, deletions: usize },
    RegenerateOnly,
}

/// User-confirmation capability injected into the orchestrator so the
/// three-phase commit stays testable without any UI present.
#[async_trait]
pub trait UserConfirmation: Send + Sync {
    async fn confirm(&self, request: ConfirmationRequest) -> bool;
}

pub struct AlwaysConfirm;

#[async_trait]
impl UserConfirmation for AlwaysConfirm {
    async fn confirm(&self, _request: ConfirmationRequest) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    CatalogRefreshed(Vec<FontResource>),
    ApplyStarted {
        job_id: JobId,
        adopted: bool,
    },
    /// Aggregated phase-1/phase-2 per-item failures and refusals.
    /// Non-blocking: the cycle went on to phase 3 regardless.
    ApplyWarnings(Vec<String>),
    JobProgress {
        job_id: JobId,
        status: JobStatus,
        message: Option<String>,
    },
    JobCompleted {
        job_id: JobId,
    },
    JobFailed {
        job_id: JobId,
        detail: Option<String>,
    },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTrackerState {
    Idle,
    Running {
        job_id: JobId,
        status: JobStatus,
        progress_message: Option<String>,
    },
    Completed {
        job_id: JobId,
    },
    Failed {
        job_id: JobId,
        error_detail: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
    /// True when the server reported a regeneration already in
    /// progress and this cycle attached to it instead of starting one.
    pub adopted: bool,
}

#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub job: JobHandle,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("apply cancelled at the confirmation prompt")]
    Cancelled,
    #[error("session is not authorized for font changes")]
    Unauthorized,
    #[error("font server unreachable: {0}")]
    Transport(String),
    #[error("apply request rejected: {0}")]
    Rejected(String),
}

/// Client-side controller for font management: accumulates pending
/// edits, runs the three-phase apply against the store, and tracks the
/// regeneration job it triggers.
///
/// The catalog snapshot is only ever replaced by [`refresh_catalog`]
/// (called explicitly, or by the tracker once a job finishes); the
/// pending set is only mutated by direct user actions and by the
/// orchestrator clearing it after a submitted batch.
///
/// [`refresh_catalog`]: FontConsoleClient::refresh_catalog
pub struct FontConsoleClient {
    store: Arc<dyn FontStore>,
    confirmation: Arc<dyn UserConfirmation>,
    pending: Mutex<PendingChangeSet>,
    catalog: RwLock<FontCatalog>,
    tracker: RwLock<JobTrackerState>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl FontConsoleClient {
    pub fn new(store: Arc<dyn FontStore>) -> Arc<Self> {
        Self::new_with_confirmation(store, Arc::new(AlwaysConfirm))
    }

    pub fn new_with_confirmation(
        store: Arc<dyn FontStore>,
        confirmation: Arc<dyn UserConfirmation>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            store,
            confirmation,
            pending: Mutex::new(PendingChangeSet::new()),
            catalog: RwLock::new(FontCatalog::default()),
            tracker: RwLock::new(JobTrackerState::Idle),
            poll_task: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events.subscribe()
    }

    pub async fn store_status(&self) -> Result<FontStoreStatus, StoreError> {
        self.store.status().await
    }

    /// Replaces the catalog snapshot with the server's current state.
    /// Idempotent; safe to call at any time.
    pub async fn refresh_catalog(&self) -> Result<(), StoreError> {
        let resources = self.store.list(None, None).await?;
        info!(count = resources.len(), "fonts: catalog refreshed");
        {
            let mut catalog = self.catalog.write().await;
            *catalog = FontCatalog::new(resources.clone());
        }
        let _ = self.events.send(ConsoleEvent::CatalogRefreshed(resources));
        Ok(())
    }

    pub async fn catalog_snapshot(&self) -> FontCatalog {
        self.catalog.read().await.clone()
    }

    pub async fn pending_snapshot(&self) -> PendingChangeSet {
        self.pending.lock().await.clone()
    }

    pub async fn has_pending_changes(&self) -> bool {
        !self.pending.lock().await.is_empty()
    }

    pub async fn add_font_files<I>(&self, files: I)
    where
        I: IntoIterator<Item = PendingFontFile>,
    {
        self.pending.lock().await.add_files(files);
    }

    pub async fn remove_addition(&self, file_name: &str) {
        self.pending.lock().await.remove_addition(file_name);
    }

    pub async fn clear_additions(&self) {
        self.pending.lock().await.clear_additions();
    }

    pub async fn mark_for_deletion(&self, name: impl Into<String>) {
        self.pending.lock().await.mark_for_deletion(name);
    }

    pub async fn unmark_for_deletion(&self, name: &str) {
        self.pending.lock().await.unmark_for_deletion(name);
    }

    pub async fn mark_all_custom_for_deletion(&self) {
        let catalog = self.catalog.read().await.clone();
        self.pending.lock().await.mark_all_custom(&catalog);
    }

    pub async fn unmark_all_deletions(&self) {
        self.pending.lock().await.unmark_all();
    }

    pub async fn job_tracker_state(&self) -> JobTrackerState {
        self.tracker.read().await.clone()
    }

    /// Runs one apply cycle: phase 1 uploads, phase 2 deduplicated
    /// deletes, phase 3 regeneration trigger, then hands the job to
    /// the poll loop. Phases are hard barriers; phase n+1 starts only
    /// after every phase-n call has settled.
    pub async fn apply_pending_changes(self: &Arc<Self>) -> Result<ApplyReport, ApplyError> {
        let pending = self.pending.lock().await.clone();
        let catalog = self.catalog.read().await.clone();

        let request = if pending.is_empty() {
            ConfirmationRequest::RegenerateOnly
        } else {
            ConfirmationRequest::ApplyPending {
                additions: pending.addition_count(),
                deletions: pending.deletion_count(),
            }
        };
        if !self.confirmation.confirm(request).await {
            info!("fonts: apply cancelled at confirmation prompt");
            return Err(ApplyError::Cancelled);
        }

        let mut warnings = Vec::new();

        // Phase 1: uploads are independent of each other and issued
        // concurrently; a single bad file must not sink the rest.
        let uploads = pending.additions().iter().map(|file| {
            let store = Arc::clone(&self.store);
            let name = file.file_name.clone();
            let bytes = file.bytes.clone();
            async move {
                let result = store.upload(&name, bytes).await;
                (name, result)
            }
        });
        let mut unauthorized = false;
        for (name, result) in join_all(uploads).await {
            match result {
                Ok(resource) => {
                    info!(family = %resource.name, file = %name, "fonts: uploaded");
                }
                Err(StoreError::Unauthorized) => unauthorized = true,
                Err(err) => {
                    warn!(file = %name, %err, "fonts: upload failed");
                    warnings.push(format!("upload failed for {name}: {err}"));
                }
            }
        }
        if unauthorized {
            // Not a per-item failure: the session itself is invalid,
            // so phases 2 and 3 are never issued.
            return Err(ApplyError::Unauthorized);
        }

        // Phase 2: deletions are requested by family name but executed
        // by physical file. Only custom families are deletable; the
        // pending set accepts any name, so the origin check happens
        // here, not at marking time. Surviving names are resolved and
        // unioned so a file shared between marked families is deleted
        // exactly once.
        let mut deletable = Vec::new();
        for name in pending.deletions() {
            match catalog.get(name) {
                Some(resource) if !resource.is_custom() => {
                    warn!(family = %name, "fonts: refusing to delete builtin family");
                    warnings.push(format!("{name} is builtin and cannot be deleted"));
                }
                _ => deletable.push(name),
            }
        }
        let targets = catalog.backing_files_for(deletable);
        let deletes = targets.into_iter().map(|file| {
            let store = Arc::clone(&self.store);
            async move {
                let result = store.delete_file(&file).await;
                (file, result)
            }
        });
        for (file, result) in join_all(deletes).await {
            match result {
                Ok(DeleteOutcome::Deleted) => {
                    info!(%file, "fonts: deleted backing file");
                }
                Ok(DeleteOutcome::NotFound) => {
                    // Already gone, most likely from an earlier
                    // partially completed apply. Idempotent no-op.
                    info!(%file, "fonts: backing file already absent");
                }
                Err(StoreError::Unauthorized) => unauthorized = true,
                Err(err) => {
                    warn!(%file, %err, "fonts: delete failed");
                    warnings.push(format!("delete failed for {file}: {err}"));
                }
            }
        }
        if unauthorized {
            return Err(ApplyError::Unauthorized);
        }

        // The batch is submitted now; failed items were reported above
        // and are not retried automatically, so the local edits are
        // stale regardless of what phase 3 says.
        self.pending.lock().await.clear();

        if !warnings.is_empty() {
            let _ = self
                .events
                .send(ConsoleEvent::ApplyWarnings(warnings.clone()));
        }

        // Phase 3: always triggered, even for a zero-change cycle.
        let job = match self.store.apply_changes().await {
            Ok(ApplyOutcome::Started(job_id)) => JobHandle {
                job_id,
                adopted: false,
            },
            Ok(ApplyOutcome::AlreadyRunning(job_id)) => {
                info!(job_id = job_id.0, "fonts: regeneration already running, adopting job");
                JobHandle {
                    job_id,
                    adopted: true,
                }
            }
            Err(StoreError::Unauthorized) => return Err(ApplyError::Unauthorized),
            Err(StoreError::Transport(message)) => return Err(ApplyError::Transport(message)),
            Err(err) => return Err(ApplyError::Rejected(err.to_string())),
        };

        let _ = self.events.send(ConsoleEvent::ApplyStarted {
            job_id: job.job_id,
            adopted: job.adopted,
        });
        self.track_job(job.job_id).await;

        Ok(ApplyReport { job, warnings })
    }

    /// Starts polling `job_id` until it reaches a terminal status,
    /// replacing (and cancelling) any poll task already running.
    pub async fn track_job(self: &Arc<Self>, job_id: JobId) {
        // One critical section on the task slot: the previous loop is
        // dead before the new state becomes visible, so a stale poll
        // cannot overwrite it or emit for the old job.
        let mut slot = self.poll_task.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        {
            let mut state = self.tracker.write().await;
            *state = JobTrackerState::Running {
                job_id,
                status: JobStatus::Queued,
                progress_message: None,
            };
        }

        let client = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            client.poll_job_until_terminal(job_id).await;
        }));
    }

    /// Cancels the poll task. Nothing can mutate tracker state after
    /// this returns; the abort is synchronous from the task's point of
    /// view (it can no longer be scheduled).
    pub async fn shutdown(&self) {
        if let Some(task) = self.poll_task.lock().await.take() {
            task.abort();
        }
    }

    async fn poll_job_until_terminal(self: Arc<Self>, job_id: JobId) {
        loop {
            tokio::time::sleep(JOB_POLL_INTERVAL).await;

            // Sequential awaits keep at most one poll in flight, so
            // statuses can never be applied out of order.
            let payload = match self.store.job_status(job_id).await {
                Ok(payload) => payload,
                Err(err) => {
                    // The job keeps running server-side through client
                    // connectivity blips; retry on the next tick.
                    warn!(job_id = job_id.0, %err, "fonts: job status poll failed");
                    continue;
                }
            };

            if payload.status.is_terminal() {
                self.finish_job(job_id, payload).await;
                break;
            }

            {
                let mut state = self.tracker.write().await;
                *state = JobTrackerState::Running {
                    job_id,
                    status: payload.status,
                    progress_message: payload.progress_message.clone(),
                };
            }
            let _ = self.events.send(ConsoleEvent::JobProgress {
                job_id,
                status: payload.status,
                message: payload.progress_message,
            });
        }
    }

    async fn finish_job(&self, job_id: JobId, payload: JobStatusPayload) {
        if payload.status == JobStatus::Failed {
            warn!(
                job_id = job_id.0,
                detail = payload.error_detail.as_deref().unwrap_or("none"),
                "fonts: regeneration failed"
            );
            {
                let mut state = self.tracker.write().await;
                *state = JobTrackerState::Failed {
                    job_id,
                    error_detail: payload.error_detail.clone(),
                };
            }
            let _ = self.events.send(ConsoleEvent::JobFailed {
                job_id,
                detail: payload.error_detail,
            });
        } else {
            info!(job_id = job_id.0, "fonts: regeneration completed");
            {
                let mut state = self.tracker.write().await;
                *state = JobTrackerState::Completed { job_id };
            }
            let _ = self.events.send(ConsoleEvent::JobCompleted { job_id });
        }

        // Refresh after failure too: phase 1/2 mutations may have
        // landed even though the regeneration itself fell over.
        if let Err(err) = self.refresh_catalog().await {
            let _ = self.events.send(ConsoleEvent::Error(format!(
                "catalog refresh after job {} failed: {err}",
                job_id.0
            )));
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
