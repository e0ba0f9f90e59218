//! Application Lifecycle Integration Tests
//!
//! One application per (job, worker) pair, terminal accept/reject decisions,
//! and deterministic timestamps through the injected clock.

use std::sync::Arc;

use rust_decimal::Decimal;
use worksite_core::application::matching::{MatchingService, PostJobRequest, SubmitRequest};
use worksite_core::application::retry::RetryPolicy;
use worksite_core::domain::{ApplicationStatus, DomainError, JobStatus};
use worksite_core::error::{AppError, ErrorKind};
use worksite_core::port::id_provider::UuidProvider;
use worksite_core::port::time_provider::mocks::FixedTimeProvider;
use worksite_core::port::time_provider::SystemTimeProvider;
use worksite_infra_sqlite::{create_pool, run_migrations, SqliteMatchStore};

/// Concurrency: duplicate submissions race, only one row lands
/// 같은 (job, worker) 쌍으로 동시에 지원해도 한 건만 저장되는가?
#[tokio::test]
async fn test_duplicate_submissions_race_single_winner() {
    let db_path = "/tmp/worksite_test_duplicate_submits.db";
    let _ = std::fs::remove_file(db_path);
    let _ = std::fs::remove_file(format!("{}-wal", db_path));
    let _ = std::fs::remove_file(format!("{}-shm", db_path));

    let pool = create_pool(db_path).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool.clone(), time_provider.clone()));
    let service = Arc::new(
        MatchingService::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(UuidProvider),
            time_provider,
        )
        .with_retry_policy(RetryPolicy::new(16, 2)),
    );

    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-1".to_string(),
            title: "Night guard".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(48000, 2),
            required_workers: 1,
        })
        .await
        .unwrap();

    // The same worker taps submit 8 times at once
    let mut handles = Vec::new();
    for _ in 0..8 {
        let svc = service.clone();
        let job_id = job.id.clone();
        handles.push(tokio::spawn(async move {
            svc.submit_application(SubmitRequest {
                job_id,
                worker_id: "eager-worker".to_string(),
            })
            .await
        }));
    }

    let mut submitted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => submitted += 1,
            Err(AppError::Domain(DomainError::DuplicateApplication { .. })) => duplicates += 1,
            Err(other) => panic!("Unexpected submit error: {}", other),
        }
    }

    assert_eq!(submitted, 1, "Exactly one submission should win");
    assert_eq!(duplicates, 7, "Every other submission should be refused");

    let applications = service.applications_for_job(&job.id).await.unwrap();
    assert_eq!(applications.len(), 1, "Only one row may exist for the pair");
    assert_eq!(applications[0].worker_id, "eager-worker");

    let _ = std::fs::remove_file(db_path);
    let _ = std::fs::remove_file(format!("{}-wal", db_path));
    let _ = std::fs::remove_file(format!("{}-shm", db_path));
    println!("✅ Duplicate race: 1 winner, 7 refusals, 1 stored row");
}

/// A rejection does not free the pair for a second application
#[tokio::test]
async fn test_resubmitting_after_rejection_is_refused() {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool, time_provider.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(UuidProvider),
        time_provider,
    );

    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-2".to_string(),
            title: "Line cook".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(52000, 2),
            required_workers: 2,
        })
        .await
        .unwrap();

    let application = service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "cook-a".to_string(),
        })
        .await
        .unwrap();
    service.reject_application(&application.id).await.unwrap();

    // Second try for the same pair bounces off the uniqueness rule
    let err = service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "cook-a".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        AppError::Domain(DomainError::DuplicateApplication { job_id, worker_id }) => {
            assert_eq!(job_id, job.id);
            assert_eq!(worker_id, "cook-a");
        }
        other => panic!("Expected duplicate refusal, got: {}", other),
    }

    // A different worker is still welcome
    service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "cook-b".to_string(),
        })
        .await
        .unwrap();

    println!("✅ Resubmission after rejection refused");
}

/// Accept is terminal: a second accept is refused and the counter holds
#[tokio::test]
async fn test_double_accept_is_refused() {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool, time_provider.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(UuidProvider),
        time_provider,
    );

    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-3".to_string(),
            title: "Forklift operator".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(61000, 2),
            required_workers: 2,
        })
        .await
        .unwrap();

    let application = service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "driver-a".to_string(),
        })
        .await
        .unwrap();

    let accepted = service.accept_application(&application.id).await.unwrap();
    assert_eq!(accepted.status, ApplicationStatus::Accepted);

    let err = service
        .accept_application(&application.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    match err {
        AppError::Domain(DomainError::InvalidStateTransition { from, to }) => {
            assert_eq!(from, "ACCEPTED");
            assert_eq!(to, "ACCEPTED");
        }
        other => panic!("Expected invalid transition, got: {}", other),
    }

    // The failed attempt must not have touched the counter
    let snapshot = service.job_status(&job.id).await.unwrap();
    assert_eq!(snapshot.filled_slots, 1);
    assert_eq!(snapshot.status, JobStatus::Open);

    println!("✅ Double accept refused, counter untouched");
}

/// A rejected application cannot be accepted later
#[tokio::test]
async fn test_reject_then_accept_is_refused() {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool, time_provider.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(UuidProvider),
        time_provider,
    );

    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-4".to_string(),
            title: "Dishwasher".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(43000, 2),
            required_workers: 1,
        })
        .await
        .unwrap();

    let application = service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "worker-r".to_string(),
        })
        .await
        .unwrap();

    let rejected = service.reject_application(&application.id).await.unwrap();
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert!(rejected.decided_at.is_some());

    let err = service
        .accept_application(&application.id)
        .await
        .unwrap_err();
    match err {
        AppError::Domain(DomainError::InvalidStateTransition { from, to }) => {
            assert_eq!(from, "REJECTED");
            assert_eq!(to, "ACCEPTED");
        }
        other => panic!("Expected invalid transition, got: {}", other),
    }

    // No slot was consumed along the way
    let snapshot = service.job_status(&job.id).await.unwrap();
    assert_eq!(snapshot.filled_slots, 0);
    assert_eq!(snapshot.status, JobStatus::Open);

    println!("✅ Reject then accept refused");
}

/// Reject is terminal too
#[tokio::test]
async fn test_double_reject_is_refused() {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool, time_provider.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(UuidProvider),
        time_provider,
    );

    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-5".to_string(),
            title: "Window cleaner".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(45000, 2),
            required_workers: 1,
        })
        .await
        .unwrap();

    let application = service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "worker-w".to_string(),
        })
        .await
        .unwrap();

    service.reject_application(&application.id).await.unwrap();

    let err = service
        .reject_application(&application.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidStateTransition { .. })
    ));

    println!("✅ Double reject refused");
}

/// Unknown job and application ids report not-found, not a crash
#[tokio::test]
async fn test_unknown_entities_report_not_found() {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteMatchStore::new(pool, time_provider.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(UuidProvider),
        time_provider,
    );

    let err = service
        .submit_application(SubmitRequest {
            job_id: "ghost-job".to_string(),
            worker_id: "worker-x".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::JobNotFound(_))));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let ghost = "ghost-application".to_string();
    let err = service.accept_application(&ghost).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::ApplicationNotFound(_))
    ));

    let err = service.reject_application(&ghost).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::ApplicationNotFound(_))
    ));

    let err = service.job_status(&"ghost-job".to_string()).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::JobNotFound(_))));

    println!("✅ Unknown entities report not-found");
}

/// Every stored timestamp comes from the injected clock
#[tokio::test]
async fn test_timestamps_come_from_the_injected_clock() {
    const T0: i64 = 1_700_000_000_000;

    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let clock = Arc::new(FixedTimeProvider::new(T0));
    let store = Arc::new(SqliteMatchStore::new(pool, clock.clone()));
    let service = MatchingService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(UuidProvider),
        clock.clone(),
    );

    let job = service
        .post_job(PostJobRequest {
            employer_id: "employer-6".to_string(),
            title: "Single courier".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(50000, 2),
            required_workers: 1,
        })
        .await
        .unwrap();
    assert_eq!(job.created_at, T0);

    let application = service
        .submit_application(SubmitRequest {
            job_id: job.id.clone(),
            worker_id: "courier-a".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(application.applied_at, T0);
    assert_eq!(application.decided_at, None);
    assert_eq!(application.status, ApplicationStatus::Pending);

    // Decision lands 5 seconds later; the auto-closure stamps the same instant
    clock.advance(5_000);
    let accepted = service.accept_application(&application.id).await.unwrap();
    assert_eq!(accepted.decided_at, Some(T0 + 5_000));

    let closed_job = service.get_job(&job.id).await.unwrap();
    assert_eq!(closed_job.status, JobStatus::Closed);
    assert_eq!(closed_job.closed_at, Some(T0 + 5_000));

    // Rejections use the clock as well
    let job_b = service
        .post_job(PostJobRequest {
            employer_id: "employer-6".to_string(),
            title: "Backup courier".to_string(),
            description: String::new(),
            daily_wage: Decimal::new(50000, 2),
            required_workers: 2,
        })
        .await
        .unwrap();
    let application_b = service
        .submit_application(SubmitRequest {
            job_id: job_b.id.clone(),
            worker_id: "courier-b".to_string(),
        })
        .await
        .unwrap();

    clock.advance(2_500);
    let rejected = service.reject_application(&application_b.id).await.unwrap();
    assert_eq!(rejected.decided_at, Some(T0 + 7_500));

    println!("✅ Timestamps deterministic through the injected clock");
}
