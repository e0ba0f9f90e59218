// Close Job Use Case

use crate::domain::{Job, JobId};
use crate::error::Result;
use crate::port::{JobStore, TimeProvider};
use tracing::info;

/// Execute the administrative close use case
///
/// The employer withdraws a job before its slots fill. The store-side
/// conditional update makes the flip one-way even against a concurrent
/// acceptance filling the last slot.
///
/// # Arguments
///
/// * `job_store` - Job repository
/// * `time_provider` - Time provider (injected for determinism)
/// * `job_id` - Job to close
pub async fn execute(
    job_store: &dyn JobStore,
    time_provider: &dyn TimeProvider,
    job_id: &JobId,
) -> Result<Job> {
    let job = job_store.close(job_id, time_provider.now_millis()).await?;

    info!(
        job_id = %job.id,
        filled_slots = job.filled_slots,
        required_workers = job.required_workers,
        "Job closed by employer"
    );
    Ok(job)
}
