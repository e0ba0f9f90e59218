// Accept Application Use Case

use crate::domain::{Application, ApplicationId, ApplicationStatus, DomainError, JobStatus};
use crate::error::Result;
use crate::port::{TimeProvider, TransactionalMatchStore};
use tracing::info;

/// Execute the accept use case (one transaction around the whole decision)
///
/// Five steps, all or nothing: load the application, guard its state, guard
/// the job, take one slot through the guarded increment (which also closes
/// the job when the last slot fills), then flip the application to accepted.
/// Any failure drops the transaction and the store keeps its pre-call state,
/// so a slot is never consumed for an application that did not land.
///
/// # Arguments
///
/// * `store` - Transactional match store
/// * `time_provider` - Time provider (injected for determinism)
/// * `application_id` - Application to accept
pub async fn execute(
    store: &dyn TransactionalMatchStore,
    time_provider: &dyn TimeProvider,
    application_id: &ApplicationId,
) -> Result<Application> {
    let now = time_provider.now_millis();
    let mut tx = store.begin_transaction().await?;

    let mut application = tx
        .find_application(application_id)
        .await?
        .ok_or_else(|| DomainError::ApplicationNotFound(application_id.clone()))?;

    // Only pending applications can be decided
    application.accept(now)?;

    let job = tx
        .find_job(&application.job_id)
        .await?
        .ok_or_else(|| DomainError::JobNotFound(application.job_id.clone()))?;

    // A full job reports SlotOverflow ("job just filled"); a job closed below
    // capacity reports JobAlreadyClosed (employer withdrew it). Checked here
    // for the fast path and re-checked by the guarded increment.
    if job.is_full() {
        return Err(DomainError::SlotOverflow(job.id).into());
    }
    if job.status != JobStatus::Open {
        return Err(DomainError::JobAlreadyClosed(job.id).into());
    }

    let filled_slots = tx.increment_filled(&job.id).await?;

    tx.update_application_status(
        &application.id,
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        now,
    )
    .await?;

    tx.commit().await?;

    info!(
        application_id = %application.id,
        job_id = %application.job_id,
        worker_id = %application.worker_id,
        filled_slots,
        required_workers = job.required_workers,
        job_closed = filled_slots >= job.required_workers,
        "Application accepted"
    );
    Ok(application)
}
