//! In-memory job store (primary storage).
//!
//! One authoritative record per job id, held behind an `Arc<RwLock>` and
//! shared between the submission path, each job's own continuation, and
//! status lookups. Mutations are partial merges; progress is monotonic and
//! terminal states are absorbing.
//!
//! Retention is an explicit `expires_at` on each record, enforced lazily on
//! read plus an optional [`JobStore::sweep_expired`] pass, rather than a
//! fire-and-forget timer callback per job.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use leadlens_shared::{AnalysisResult, Job, JobError, JobId, JobStatus, LeadLensError};

/// Shared in-memory job map with time-bounded retention.
#[derive(Clone)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<JobId, Job>>>,
    retention: Duration,
}

impl JobStore {
    /// Create a store whose records expire `retention_secs` after creation.
    pub fn new(retention_secs: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            retention: Duration::seconds(retention_secs as i64),
        }
    }

    /// Create a new job record with status `Started` and progress 0.
    pub async fn create(&self) -> Job {
        let now = Utc::now();
        let job = Job {
            id: JobId::new(),
            status: JobStatus::Started,
            progress: 0,
            stage: "Initializing".into(),
            started_at: now,
            expires_at: now + self.retention,
            result: None,
            error: None,
        };

        self.inner
            .write()
            .await
            .insert(job.id.clone(), job.clone());
        debug!(job_id = %job.id, "job created");
        job
    }

    /// Look up a job, lazily evicting it if its retention window elapsed.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        let now = Utc::now();
        let mut jobs = self.inner.write().await;
        if jobs.get(id).is_some_and(|job| job.is_expired(now)) {
            jobs.remove(id);
            debug!(job_id = %id, "expired job evicted on read");
            return None;
        }
        jobs.get(id).cloned()
    }

    /// Apply a partial merge to a live job. Returns the updated record, or
    /// `None` if the job is absent, expired, or already terminal.
    pub async fn update<F>(&self, id: &JobId, apply: F) -> Option<Job>
    where
        F: FnOnce(&mut Job),
    {
        let now = Utc::now();
        let mut jobs = self.inner.write().await;
        if jobs.get(id).is_some_and(|job| job.is_expired(now)) {
            jobs.remove(id);
            return None;
        }

        let job = jobs.get_mut(id)?;
        if job.status.is_terminal() {
            warn!(job_id = %id, status = ?job.status, "update ignored on terminal job");
            return None;
        }

        apply(job);
        Some(job.clone())
    }

    /// Advance progress and stage. Progress never decreases.
    pub async fn set_progress(&self, id: &JobId, progress: u8, stage: &str) {
        self.update(id, |job| {
            job.progress = job.progress.max(progress);
            job.stage = stage.to_string();
            if job.status == JobStatus::Started {
                job.status = JobStatus::Processing;
            }
        })
        .await;
    }

    /// Mark a job completed with its assembled result. Returns the terminal
    /// record for archiving, if the job was still live.
    pub async fn complete(&self, id: &JobId, result: AnalysisResult) -> Option<Job> {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.stage = "Done".into();
            job.result = Some(result);
        })
        .await
    }

    /// Mark a job failed, capturing the error's message and code.
    pub async fn fail(&self, id: &JobId, error: &LeadLensError) {
        self.update(id, |job| {
            job.status = JobStatus::Error;
            job.stage = "Failed".into();
            job.error = Some(JobError {
                message: error.to_string(),
                code: error.code().to_string(),
                timestamp: Utc::now(),
            });
        })
        .await;
    }

    /// Remove every expired record. Returns how many were evicted.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut jobs = self.inner.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.is_expired(now));
        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!(evicted, "expired jobs swept");
        }
        evicted
    }

    /// Number of live (possibly expired, not yet swept) records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store currently holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
