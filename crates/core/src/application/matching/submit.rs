// Submit Application Use Case

use crate::domain::{Application, DomainError, JobStatus};
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider, TransactionalMatchStore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Submit request: a worker applies for one slot on a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub job_id: String,
    pub worker_id: String,
}

/// Execute the submit use case (with transaction for atomicity)
///
/// The open-check and the insert share one transaction, and the store's
/// (job_id, worker_id) uniqueness constraint decides duplicate races. A race
/// with a closing job is settled by the store serializing the two writes; the
/// loser re-reads and sees the closed job.
///
/// # Arguments
///
/// * `store` - Transactional match store
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Submit request
pub async fn execute(
    store: &dyn TransactionalMatchStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: SubmitRequest,
) -> Result<Application> {
    let mut tx = store.begin_transaction().await?;

    // Closed jobs take no new applications
    let job = tx
        .find_job(&req.job_id)
        .await?
        .ok_or_else(|| DomainError::JobNotFound(req.job_id.clone()))?;
    if job.status != JobStatus::Open {
        return Err(DomainError::JobClosed(job.id).into());
    }

    let application = Application::new(
        id_provider.generate_id(),
        req.job_id,
        req.worker_id,
        time_provider.now_millis(),
    );
    tx.insert_application(&application).await?;

    tx.commit().await?;

    info!(
        application_id = %application.id,
        job_id = %application.job_id,
        worker_id = %application.worker_id,
        "Application submitted"
    );
    Ok(application)
}
