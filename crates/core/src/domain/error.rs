// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    /// A closed job does not take new applications.
    #[error("Job is closed to new applications: {0}")]
    JobClosed(String),

    /// Acceptance or close attempted against a job that already left the open
    /// state below capacity.
    #[error("Job is already closed: {0}")]
    JobAlreadyClosed(String),

    /// One application per (job, worker), for the lifetime of the job.
    #[error("Worker {worker_id} already applied for job {job_id}")]
    DuplicateApplication { job_id: String, worker_id: String },

    /// Every slot is filled; the guarded increment refused to go past capacity.
    #[error("All slots for job {0} are already filled")]
    SlotOverflow(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
