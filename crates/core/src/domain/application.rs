// Application Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// Application ID (UUID v4)
pub type ApplicationId = String;

/// Worker identifier
pub type WorkerId = String;

/// Application lifecycle status
///
/// `Pending` is the only non-terminal state. Once an application is accepted
/// or rejected it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "PENDING"),
            ApplicationStatus::Accepted => write!(f, "ACCEPTED"),
            ApplicationStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Application Entity
///
/// At most one application exists per (job, worker) pair; the store enforces
/// the uniqueness, the entity just carries the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub worker_id: WorkerId,

    pub status: ApplicationStatus,

    pub applied_at: i64, // epoch ms
    pub decided_at: Option<i64>,
}

impl Application {
    /// Create a new pending application
    pub fn new(
        id: impl Into<String>,
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
        applied_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            worker_id: worker_id.into(),
            status: ApplicationStatus::Pending,
            applied_at,
            decided_at: None,
        }
    }

    /// True once the application reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status != ApplicationStatus::Pending
    }

    /// Transition to Accepted with explicit timestamp
    pub fn accept(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: "ACCEPTED".to_string(),
            });
        }
        self.status = ApplicationStatus::Accepted;
        self.decided_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Rejected with explicit timestamp
    pub fn reject(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: "REJECTED".to_string(),
            });
        }
        self.status = ApplicationStatus::Rejected;
        self.decided_at = Some(now_millis);
        Ok(())
    }
}
