// Application Store Port (Interface)

use crate::domain::{Application, ApplicationId, ApplicationStatus, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Application persistence
///
/// Creation is absent on purpose: new applications are inserted only inside
/// the submission transaction, where the job-open check and the (job, worker)
/// uniqueness constraint hold together.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Find application by ID
    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>>;

    /// All applications for a job, oldest first
    async fn find_by_job(&self, job_id: &JobId) -> Result<Vec<Application>>;

    /// Count applications for a job by status
    async fn count_by_status(&self, job_id: &JobId, status: ApplicationStatus) -> Result<i64>;

    /// Conditional status transition, guarded at the store
    ///
    /// The update applies only if the application is still in `expected` at
    /// the instant of the write; otherwise no row changes. Returns the updated
    /// application.
    ///
    /// # Errors
    /// - `ApplicationNotFound` if no such application exists
    /// - `InvalidStateTransition` if the application already left `expected`
    async fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        decided_at: i64,
    ) -> Result<Application>;
}
