// Job Store Port (Interface)

use crate::domain::{Job, JobId, JobStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Job persistence
///
/// There is deliberately no general `update` here: `filled_slots` moves only
/// through the guarded increment on `MatchStoreTransaction`, and the status
/// flip goes through `close`. Nothing else about a job changes after posting.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Administratively close an open job (conditional open -> closed)
    ///
    /// The update applies only if the job is still open at the instant of the
    /// write. Returns the closed job.
    ///
    /// # Errors
    /// - `JobNotFound` if no such job exists
    /// - `JobAlreadyClosed` if the job already left the open state
    async fn close(&self, id: &JobId, now_millis: i64) -> Result<Job>;

    /// Count jobs by status
    async fn count_by_status(&self, status: JobStatus) -> Result<i64>;

    /// Find all jobs by status, oldest first
    async fn find_by_status(&self, status: JobStatus) -> Result<Vec<Job>>;
}
