// Post Job Use Case

use crate::domain::Job;
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobStore, TimeProvider};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Post job request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostJobRequest {
    pub employer_id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub daily_wage: Decimal,
    pub required_workers: i32,
}

fn validate(req: &PostJobRequest) -> Result<()> {
    if req.required_workers < 1 {
        return Err(AppError::Validation(format!(
            "required_workers must be at least 1, got {}",
            req.required_workers
        )));
    }
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if req.daily_wage.is_sign_negative() {
        return Err(AppError::Validation(
            "daily_wage must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Execute the post-job use case
///
/// # Arguments
///
/// * `job_store` - Job repository
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Post request
pub async fn execute(
    job_store: &dyn JobStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: PostJobRequest,
) -> Result<Job> {
    validate(&req)?;

    let job = Job::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        req.employer_id,
        req.title,
        req.description,
        req.daily_wage,
        req.required_workers,
    );

    job_store.insert(&job).await?;

    info!(
        job_id = %job.id,
        employer_id = %job.employer_id,
        required_workers = job.required_workers,
        "Job posted"
    );
    Ok(job)
}
