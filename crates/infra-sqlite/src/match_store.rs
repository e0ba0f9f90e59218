// SQLite Match Store Implementation

use crate::SqliteMatchTransaction;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use worksite_core::domain::{
    Application, ApplicationId, ApplicationStatus, DomainError, Job, JobId, JobStatus,
};
use worksite_core::error::{AppError, Result};
use worksite_core::port::{
    ApplicationStore, JobStore, MatchStoreTransaction, TimeProvider, TransactionalMatchStore,
};

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // Extract database-specific error code and message
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "5" | "517" => {
                        // SQLITE_BUSY / SQLITE_BUSY_SNAPSHOT - transient lock
                        // contention, safe to retry
                        AppError::Busy(format!("Database locked: {}", db_err.message()))
                    }
                    "2067" | "1555" => {
                        // UNIQUE / PRIMARY KEY constraint failed
                        AppError::Database(format!(
                            "Unique constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "787" | "3850" => {
                        // FOREIGN KEY constraint failed
                        AppError::Database(format!(
                            "Foreign key constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Database(format!("Database full: {}", db_err.message()))
                    }
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolTimedOut => AppError::Busy("Connection pool timed out".to_string()),
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

// SQLITE_CONSTRAINT_UNIQUE (2067) on an application insert can only come from
// the (job_id, worker_id) index, so it maps to the domain duplicate error.
// Everything else falls through to the generic mapping.
pub(crate) fn map_application_insert_error(err: sqlx::Error, application: &Application) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("2067") {
            return DomainError::DuplicateApplication {
                job_id: application.job_id.clone(),
                worker_id: application.worker_id.clone(),
            }
            .into();
        }
    }
    map_sqlx_error(err)
}

pub struct SqliteMatchStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMatchStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl JobStore for SqliteMatchStore {
    async fn insert(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, employer_id, title, description, daily_wage,
                required_workers, filled_slots, status, created_at, closed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.employer_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.daily_wage.to_string())
        .bind(job.required_workers)
        .bind(job.filled_slots)
        .bind(job.status.to_string())
        .bind(job.created_at)
        .bind(job.closed_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_job()))
    }

    async fn close(&self, id: &JobId, now_millis: i64) -> Result<Job> {
        // Conditional update: only an open job flips, no matter how the call
        // races with an acceptance filling the last slot
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = ?, closed_at = ?
            WHERE id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(JobStatus::Closed.to_string())
        .bind(now_millis)
        .bind(id)
        .bind(JobStatus::Open.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(row.into_job()),
            None => {
                // No row flipped: missing job or already closed
                let exists: Option<String> =
                    sqlx::query_scalar("SELECT status FROM jobs WHERE id = ?")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(map_sqlx_error)?;

                match exists {
                    None => Err(DomainError::JobNotFound(id.clone()).into()),
                    Some(_) => Err(DomainError::JobAlreadyClosed(id.clone()).into()),
                }
            }
        }
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn find_by_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            WHERE status = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_job()).collect())
    }
}

#[async_trait]
impl ApplicationStore for SqliteMatchStore {
    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_application()))
    }

    async fn find_by_job(&self, job_id: &JobId) -> Result<Vec<Application>> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(
            r#"
            SELECT * FROM applications
            WHERE job_id = ?
            ORDER BY applied_at ASC, id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_application()).collect())
    }

    async fn count_by_status(&self, job_id: &JobId, status: ApplicationStatus) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = ? AND status = ?")
                .bind(job_id)
                .bind(status.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        decided_at: i64,
    ) -> Result<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET status = ?, decided_at = ?
            WHERE id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(next.to_string())
        .bind(decided_at)
        .bind(id)
        .bind(expected.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(row.into_application()),
            None => {
                // No row changed: missing application or already decided
                let current: Option<String> =
                    sqlx::query_scalar("SELECT status FROM applications WHERE id = ?")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(map_sqlx_error)?;

                match current {
                    None => Err(DomainError::ApplicationNotFound(id.clone()).into()),
                    Some(from) => Err(DomainError::InvalidStateTransition {
                        from,
                        to: next.to_string(),
                    }
                    .into()),
                }
            }
        }
    }
}

#[async_trait]
impl TransactionalMatchStore for SqliteMatchStore {
    async fn begin_transaction(&self) -> Result<Box<dyn MatchStoreTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteMatchTransaction::new(
            tx,
            Arc::clone(&self.time_provider),
        )))
    }
}

/// SQLite row representation of a job
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct JobRow {
    id: String,
    employer_id: String,
    title: String,
    description: String,
    daily_wage: String,
    required_workers: i32,
    filled_slots: i32,
    status: String,
    created_at: i64,
    closed_at: Option<i64>,
}

impl JobRow {
    pub(crate) fn into_job(self) -> Job {
        let status = match self.status.as_str() {
            "OPEN" => JobStatus::Open,
            "CLOSED" => JobStatus::Closed,
            _ => JobStatus::Closed, // Fail closed on unknown wire values
        };

        Job {
            id: self.id,
            employer_id: self.employer_id,
            title: self.title,
            description: self.description,
            daily_wage: Decimal::from_str(&self.daily_wage).unwrap_or(Decimal::ZERO),
            required_workers: self.required_workers,
            filled_slots: self.filled_slots,
            status,
            created_at: self.created_at,
            closed_at: self.closed_at,
        }
    }
}

/// SQLite row representation of an application
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ApplicationRow {
    id: String,
    job_id: String,
    worker_id: String,
    status: String,
    applied_at: i64,
    decided_at: Option<i64>,
}

impl ApplicationRow {
    pub(crate) fn into_application(self) -> Application {
        let status = match self.status.as_str() {
            "PENDING" => ApplicationStatus::Pending,
            "ACCEPTED" => ApplicationStatus::Accepted,
            "REJECTED" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Rejected, // Fail terminal on unknown wire values
        };

        Application {
            id: self.id,
            job_id: self.job_id,
            worker_id: self.worker_id,
            status,
            applied_at: self.applied_at,
            decided_at: self.decided_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use worksite_core::port::time_provider::SystemTimeProvider;

    async fn setup_store() -> SqliteMatchStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMatchStore::new(pool, Arc::new(SystemTimeProvider))
    }

    async fn seed_application(store: &SqliteMatchStore, application: &Application) {
        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_application(application).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn insert_and_find_job_roundtrip() {
        let store = setup_store().await;

        let job = Job::new(
            "job-rt-1",
            1000,
            "employer-1",
            "Three bricklayers",
            "Six week site",
            Decimal::new(85000, 2),
            3,
        );
        store.insert(&job).await.unwrap();

        let found = JobStore::find_by_id(&store, &job.id).await.unwrap().unwrap();
        assert_eq!(found.id, job.id);
        assert_eq!(found.title, "Three bricklayers");
        assert_eq!(found.daily_wage, Decimal::new(85000, 2));
        assert_eq!(found.required_workers, 3);
        assert_eq!(found.filled_slots, 0);
        assert_eq!(found.status, JobStatus::Open);
        assert!(found.closed_at.is_none());
    }

    #[tokio::test]
    async fn find_missing_job_returns_none() {
        let store = setup_store().await;
        let found = JobStore::find_by_id(&store, &"nope".to_string()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn close_flips_an_open_job_exactly_once() {
        let store = setup_store().await;
        let job = Job::new_test(3);
        store.insert(&job).await.unwrap();

        let closed = store.close(&job.id, 5000).await.unwrap();
        assert_eq!(closed.status, JobStatus::Closed);
        assert_eq!(closed.closed_at, Some(5000));
        assert_eq!(closed.filled_slots, 0);

        let err = store.close(&job.id, 6000).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::JobAlreadyClosed(_))
        ));
    }

    #[tokio::test]
    async fn close_missing_job_reports_not_found() {
        let store = setup_store().await;
        let err = store.close(&"nope".to_string(), 1000).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn job_counts_and_listing_follow_status() {
        let store = setup_store().await;

        let open_a = Job::new_test(2);
        let open_b = Job::new_test(2);
        let withdrawn = Job::new_test(2);
        store.insert(&open_a).await.unwrap();
        store.insert(&open_b).await.unwrap();
        store.insert(&withdrawn).await.unwrap();
        store.close(&withdrawn.id, 9000).await.unwrap();

        assert_eq!(
            JobStore::count_by_status(&store, JobStatus::Open).await.unwrap(),
            2
        );
        assert_eq!(
            JobStore::count_by_status(&store, JobStatus::Closed)
                .await
                .unwrap(),
            1
        );

        let open = store.find_by_status(JobStatus::Open).await.unwrap();
        let ids: Vec<_> = open.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec![open_a.id.as_str(), open_b.id.as_str()]);
    }

    #[tokio::test]
    async fn applications_list_oldest_first() {
        let store = setup_store().await;
        let job = Job::new_test(3);
        store.insert(&job).await.unwrap();

        seed_application(&store, &Application::new("app-b", &job.id, "worker-b", 2000)).await;
        seed_application(&store, &Application::new("app-a", &job.id, "worker-a", 1000)).await;

        let applications = store.find_by_job(&job.id).await.unwrap();
        let ids: Vec<_> = applications.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["app-a", "app-b"]);

        assert_eq!(
            ApplicationStore::count_by_status(&store, &job.id, ApplicationStatus::Pending)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            ApplicationStore::count_by_status(&store, &job.id, ApplicationStatus::Accepted)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn update_status_guards_against_double_decisions() {
        let store = setup_store().await;
        let job = Job::new_test(3);
        store.insert(&job).await.unwrap();
        seed_application(&store, &Application::new("app-1", &job.id, "worker-1", 1000)).await;

        let rejected = store
            .update_status(
                &"app-1".to_string(),
                ApplicationStatus::Pending,
                ApplicationStatus::Rejected,
                2000,
            )
            .await
            .unwrap();
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        assert_eq!(rejected.decided_at, Some(2000));

        // Second decision finds no pending row and reports the current state
        let err = store
            .update_status(
                &"app-1".to_string(),
                ApplicationStatus::Pending,
                ApplicationStatus::Rejected,
                3000,
            )
            .await
            .unwrap_err();
        match err {
            AppError::Domain(DomainError::InvalidStateTransition { from, to }) => {
                assert_eq!(from, "REJECTED");
                assert_eq!(to, "REJECTED");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn update_status_on_missing_application_reports_not_found() {
        let store = setup_store().await;
        let err = store
            .update_status(
                &"nope".to_string(),
                ApplicationStatus::Pending,
                ApplicationStatus::Rejected,
                1000,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::ApplicationNotFound(_))
        ));
    }

    #[test]
    fn unknown_wire_status_decodes_to_terminal_state() {
        // The schema CHECK keeps unknown statuses out of the table, so the
        // decode fallback is covered on the row types directly.
        let row = JobRow {
            id: "job-wire-1".to_string(),
            employer_id: "employer-1".to_string(),
            title: "Two painters".to_string(),
            description: String::new(),
            daily_wage: "620.00".to_string(),
            required_workers: 2,
            filled_slots: 1,
            status: "LIMBO".to_string(),
            created_at: 1000,
            closed_at: None,
        };
        assert_eq!(row.into_job().status, JobStatus::Closed);

        let row = ApplicationRow {
            id: "app-wire-1".to_string(),
            job_id: "job-wire-1".to_string(),
            worker_id: "worker-1".to_string(),
            status: "LIMBO".to_string(),
            applied_at: 1000,
            decided_at: None,
        };
        assert_eq!(row.into_application().status, ApplicationStatus::Rejected);
    }
}
