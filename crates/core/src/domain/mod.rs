// Domain Layer - Pure business logic and entities

pub mod application;
pub mod error;
pub mod job;

// Re-exports
pub use application::{Application, ApplicationId, ApplicationStatus, WorkerId};
pub use error::DomainError;
pub use job::{EmployerId, Job, JobId, JobStatus};
