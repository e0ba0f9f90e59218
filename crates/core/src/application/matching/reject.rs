// Reject Application Use Case

use crate::domain::{Application, ApplicationId, ApplicationStatus};
use crate::error::Result;
use crate::port::{ApplicationStore, TimeProvider};
use tracing::info;

/// Execute the reject use case
///
/// Rejection touches no slot accounting, so a single conditional update is
/// enough: pending -> rejected, guarded at the store against a concurrent
/// acceptance of the same application.
///
/// # Arguments
///
/// * `store` - Application repository
/// * `time_provider` - Time provider (injected for determinism)
/// * `application_id` - Application to reject
pub async fn execute(
    store: &dyn ApplicationStore,
    time_provider: &dyn TimeProvider,
    application_id: &ApplicationId,
) -> Result<Application> {
    let application = store
        .update_status(
            application_id,
            ApplicationStatus::Pending,
            ApplicationStatus::Rejected,
            time_provider.now_millis(),
        )
        .await?;

    info!(
        application_id = %application.id,
        job_id = %application.job_id,
        worker_id = %application.worker_id,
        "Application rejected"
    );
    Ok(application)
}
