// Job Domain Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Job ID (UUID v4)
pub type JobId = String;

/// Employer identifier
pub type EmployerId = String;

/// Job lifecycle status
///
/// One-way machine: a job starts open and ends closed, either automatically
/// when the last slot fills or administratively by the employer. There is no
/// transition out of `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    Closed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Open => write!(f, "OPEN"),
            JobStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Job Entity
///
/// `filled_slots` is the slot ledger: it only moves through [`Job::fill_slot`]
/// (or the store-side equivalent) so the `0 <= filled_slots <= required_workers`
/// invariant holds at every observable point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer_id: EmployerId,

    pub title: String,
    pub description: String,
    pub daily_wage: Decimal,

    pub required_workers: i32,
    pub filled_slots: i32,
    pub status: JobStatus,

    pub created_at: i64, // epoch ms
    pub closed_at: Option<i64>,
}

impl Job {
    /// Create a new open job with zero filled slots
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `employer_id` - Posting employer
    /// * `title` / `description` / `daily_wage` - Posting details
    /// * `required_workers` - Slot capacity; callers validate it is >= 1
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        employer_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        daily_wage: Decimal,
        required_workers: i32,
    ) -> Self {
        Self {
            id: id.into(),
            employer_id: employer_id.into(),
            title: title.into(),
            description: description.into(),
            daily_wage,
            required_workers,
            filled_slots: 0,
            status: JobStatus::Open,
            created_at,
            closed_at: None,
        }
    }

    /// Create a test job with deterministic ID and timestamp.
    ///
    /// Uses a simple counter for deterministic test IDs (job-1, job-2, ...).
    /// Timestamps start at 1000 and increment by 1000.
    ///
    /// **Note**: This method should only be used in tests. For production code,
    /// always inject ID and time via providers.
    pub fn new_test(required_workers: i32) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self::new(
            format!("job-{}", counter),
            (counter * 1000) as i64,
            format!("employer-{}", counter),
            "Test job",
            "",
            Decimal::ZERO,
            required_workers,
        )
    }

    /// True once every slot is filled.
    pub fn is_full(&self) -> bool {
        self.filled_slots >= self.required_workers
    }

    /// Fill one slot, auto-closing when the last slot fills
    ///
    /// Returns the new slot count. A full job reports `SlotOverflow`; a job
    /// closed below capacity reports `JobAlreadyClosed`. The two are distinct
    /// so callers can tell "job just filled" from "employer withdrew the job".
    pub fn fill_slot(&mut self, now_millis: i64) -> crate::domain::error::Result<i32> {
        if self.is_full() {
            return Err(crate::domain::error::DomainError::SlotOverflow(
                self.id.clone(),
            ));
        }
        if self.status != JobStatus::Open {
            return Err(crate::domain::error::DomainError::JobAlreadyClosed(
                self.id.clone(),
            ));
        }
        self.filled_slots += 1;
        if self.filled_slots >= self.required_workers {
            self.status = JobStatus::Closed;
            self.closed_at = Some(now_millis);
        }
        Ok(self.filled_slots)
    }

    /// Administratively close the job with explicit timestamp
    pub fn close(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != JobStatus::Open {
            return Err(crate::domain::error::DomainError::JobAlreadyClosed(
                self.id.clone(),
            ));
        }
        self.status = JobStatus::Closed;
        self.closed_at = Some(now_millis);
        Ok(())
    }
}
