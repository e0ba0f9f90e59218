// Matching Service - Core use cases for job/application matching

pub mod accept;
pub mod close_job;
pub mod post_job;
pub mod reject;
pub mod submit;

pub use post_job::PostJobRequest;
pub use submit::SubmitRequest;

use crate::application::retry::RetryPolicy;
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, DomainError, Job, JobId, JobStatus,
};
use crate::error::Result;
use crate::port::{ApplicationStore, IdProvider, JobStore, TimeProvider, TransactionalMatchStore};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Snapshot of a job's slot accounting, as exposed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub required_workers: i32,
    pub filled_slots: i32,
    pub status: JobStatus,
}

/// Matching Service
///
/// Facade over the matching use cases. Mutating operations run under the
/// transient-conflict retry policy; reads go straight through.
pub struct MatchingService {
    tx_store: Arc<dyn TransactionalMatchStore>,
    job_store: Arc<dyn JobStore>,
    application_store: Arc<dyn ApplicationStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    retry: RetryPolicy,
}

impl MatchingService {
    pub fn new(
        tx_store: Arc<dyn TransactionalMatchStore>,
        job_store: Arc<dyn JobStore>,
        application_store: Arc<dyn ApplicationStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            tx_store,
            job_store,
            application_store,
            id_provider,
            time_provider,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the default retry policy (builder style)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Post a new job with open slots
    pub async fn post_job(&self, req: PostJobRequest) -> Result<Job> {
        let seed = req.employer_id.clone();
        self.run_with_retry(&seed, || {
            post_job::execute(
                self.job_store.as_ref(),
                self.id_provider.as_ref(),
                self.time_provider.as_ref(),
                req.clone(),
            )
        })
        .await
    }

    /// Submit a worker's application for a job
    pub async fn submit_application(&self, req: SubmitRequest) -> Result<Application> {
        let seed = req.job_id.clone();
        self.run_with_retry(&seed, || {
            submit::execute(
                self.tx_store.as_ref(),
                self.id_provider.as_ref(),
                self.time_provider.as_ref(),
                req.clone(),
            )
        })
        .await
    }

    /// Accept a pending application, consuming one slot
    pub async fn accept_application(&self, application_id: &ApplicationId) -> Result<Application> {
        self.run_with_retry(application_id, || {
            accept::execute(
                self.tx_store.as_ref(),
                self.time_provider.as_ref(),
                application_id,
            )
        })
        .await
    }

    /// Reject a pending application
    pub async fn reject_application(&self, application_id: &ApplicationId) -> Result<Application> {
        self.run_with_retry(application_id, || {
            reject::execute(
                self.application_store.as_ref(),
                self.time_provider.as_ref(),
                application_id,
            )
        })
        .await
    }

    /// Administratively close a job
    pub async fn close_job(&self, job_id: &JobId) -> Result<Job> {
        self.run_with_retry(job_id, || {
            close_job::execute(self.job_store.as_ref(), self.time_provider.as_ref(), job_id)
        })
        .await
    }

    /// Current slot accounting for a job
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobSnapshot> {
        let job = self
            .job_store
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| DomainError::JobNotFound(job_id.clone()))?;

        Ok(JobSnapshot {
            required_workers: job.required_workers,
            filled_slots: job.filled_slots,
            status: job.status,
        })
    }

    /// Load a full job record
    pub async fn get_job(&self, job_id: &JobId) -> Result<Job> {
        self.job_store
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| DomainError::JobNotFound(job_id.clone()).into())
    }

    /// All jobs still taking applications, oldest first
    pub async fn list_open_jobs(&self) -> Result<Vec<Job>> {
        self.job_store.find_by_status(JobStatus::Open).await
    }

    /// All applications for a job, oldest first
    pub async fn applications_for_job(&self, job_id: &JobId) -> Result<Vec<Application>> {
        self.application_store.find_by_job(job_id).await
    }

    /// Count jobs by status
    pub async fn count_jobs(&self, status: JobStatus) -> Result<i64> {
        self.job_store.count_by_status(status).await
    }

    /// Count a job's applications by status
    pub async fn count_applications(
        &self,
        job_id: &JobId,
        status: ApplicationStatus,
    ) -> Result<i64> {
        self.application_store.count_by_status(job_id, status).await
    }

    /// Run a mutating operation under the retry policy
    ///
    /// `op` must be restartable from scratch: each attempt opens its own
    /// transaction and re-reads its entities.
    async fn run_with_retry<T, F, Fut>(&self, seed: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Err(err) if self.retry.should_retry(&err, attempt) => {
                    warn!(
                        error = %err,
                        attempt = attempt,
                        "Transient store conflict, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff_delay(seed, attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(RetryPolicy::surface(err)),
                ok => return ok,
            }
        }
    }
}
