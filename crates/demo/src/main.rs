//! WorkSite Matching Demo - Main Entry Point
//!
//! Replays the canonical hiring flow against a real store: post a job with
//! three slots, take applications, accept until the job auto-closes, then
//! show the late arrivals bouncing off.

use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use worksite_core::application::matching::{MatchingService, PostJobRequest, SubmitRequest};
use worksite_core::domain::{ApplicationStatus, JobStatus};
use worksite_core::port::id_provider::UuidProvider;
use worksite_core::port::time_provider::SystemTimeProvider;
use worksite_infra_sqlite::{create_pool, run_migrations, SqliteMatchStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "sqlite::memory:";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("WORKSITE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("WorkSite matching demo v{} starting...", VERSION);

    // 2. Load configuration
    let db_path = std::env::var("WORKSITE_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path).await?;
    run_migrations(&pool).await?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool, time_provider.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(UuidProvider),
        time_provider,
    );

    // 5. Employer posts a job with three slots
    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-demo".to_string(),
            title: "Construction workers needed".to_string(),
            description: "Three experienced workers for a six week site".to_string(),
            daily_wage: Decimal::from_str("850.00")?,
            required_workers: 3,
        })
        .await?;
    info!(job_id = %job.id, required_workers = job.required_workers, "Posted");

    // 6. Workers apply; a repeat from the first worker is refused
    let mut applications = Vec::new();
    for worker in ["worker-a", "worker-b", "worker-c"] {
        let application = service
            .submit_application(SubmitRequest {
                job_id: job.id.clone(),
                worker_id: worker.to_string(),
            })
            .await?;
        applications.push(application);
    }

    match service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "worker-a".to_string(),
        })
        .await
    {
        Err(err) => info!(kind = ?err.kind(), error = %err, "Duplicate application refused"),
        Ok(_) => anyhow::bail!("duplicate application was not refused"),
    }

    // 7. Accept everyone; the third acceptance closes the job
    for application in &applications {
        let accepted = service.accept_application(&application.id).await?;
        let snapshot = service.job_status(&job.id).await?;
        info!(
            application_id = %accepted.id,
            worker_id = %accepted.worker_id,
            filled_slots = snapshot.filled_slots,
            required_workers = snapshot.required_workers,
            status = %snapshot.status,
            "Accepted"
        );
    }

    // 8. A late applicant bounces off the closed job
    match service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "worker-d".to_string(),
        })
        .await
    {
        Err(err) => info!(kind = ?err.kind(), error = %err, "Late application refused"),
        Ok(_) => anyhow::bail!("application against a closed job was not refused"),
    }

    // 9. Final tallies
    let open_jobs = service.count_jobs(JobStatus::Open).await?;
    let closed_jobs = service.count_jobs(JobStatus::Closed).await?;
    let accepted = service
        .count_applications(&job.id, ApplicationStatus::Accepted)
        .await?;
    let pending = service
        .count_applications(&job.id, ApplicationStatus::Pending)
        .await?;

    info!(
        open_jobs,
        closed_jobs, accepted, pending, "Demo complete"
    );

    Ok(())
}
