// Transaction port for atomic cross-entity operations

use crate::domain::{Application, ApplicationId, ApplicationStatus, Job, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
///
/// Dropping a transaction that was never committed rolls it back, so every
/// early-return error path leaves the store at its pre-call state.
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional store operations spanning jobs and applications
#[async_trait]
pub trait TransactionalMatchStore: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn MatchStoreTransaction>>;
}

/// Match store operations within a transaction
///
/// This is the only legal write path to `filled_slots`: the guarded increment
/// and the application status flip land in one commit or not at all.
#[async_trait]
pub trait MatchStoreTransaction: Transaction {
    /// Load a job (within transaction)
    async fn find_job(&mut self, id: &JobId) -> Result<Option<Job>>;

    /// Load an application (within transaction)
    async fn find_application(&mut self, id: &ApplicationId) -> Result<Option<Application>>;

    /// Insert a new application (within transaction)
    ///
    /// The store's (job_id, worker_id) uniqueness constraint closes the
    /// duplicate race: of two concurrent inserts for the same pair exactly one
    /// succeeds, the other fails with `DuplicateApplication`.
    async fn insert_application(&mut self, application: &Application) -> Result<()>;

    /// Atomic conditional increment of a job's filled slots (within transaction)
    ///
    /// Increments only while the job is open and below capacity; auto-closure
    /// of the last slot is folded into the same guarded update. Returns the
    /// new slot count.
    ///
    /// # Errors
    /// - `JobNotFound` if no such job exists
    /// - `SlotOverflow` if every slot is already filled
    /// - `JobAlreadyClosed` if the job was closed below capacity
    async fn increment_filled(&mut self, job_id: &JobId) -> Result<i32>;

    /// Conditional application status transition (within transaction)
    ///
    /// Same contract as `ApplicationStore::update_status`, minus the re-read.
    async fn update_application_status(
        &mut self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        decided_at: i64,
    ) -> Result<()>;
}
