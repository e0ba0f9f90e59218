// SQLite Transaction Implementation

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use std::sync::Arc;
use worksite_core::domain::{
    Application, ApplicationId, ApplicationStatus, DomainError, Job, JobId, JobStatus,
};
use worksite_core::error::Result;
use worksite_core::port::{MatchStoreTransaction, TimeProvider, Transaction};

use crate::match_store::{map_application_insert_error, map_sqlx_error, ApplicationRow, JobRow};

pub struct SqliteMatchTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
    time_provider: Arc<dyn TimeProvider>,
}

impl<'a> SqliteMatchTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { tx, time_provider }
    }
}

#[async_trait]
impl Transaction for SqliteMatchTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl MatchStoreTransaction for SqliteMatchTransaction<'_> {
    async fn find_job(&mut self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_job()))
    }

    async fn find_application(&mut self, id: &ApplicationId) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_application()))
    }

    async fn insert_application(&mut self, application: &Application) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, worker_id, status, applied_at, decided_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.job_id)
        .bind(&application.worker_id)
        .bind(application.status.to_string())
        .bind(application.applied_at)
        .bind(application.decided_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_application_insert_error(e, application))?;

        Ok(())
    }

    async fn increment_filled(&mut self, job_id: &JobId) -> Result<i32> {
        let now = self.time_provider.now_millis();
        let status_open = JobStatus::Open.to_string();
        let status_closed = JobStatus::Closed.to_string();

        // One guarded statement: the increment, the capacity ceiling and the
        // auto-closure of the last slot land together. The store serializes
        // concurrent writers, so the counter can never step past capacity.
        let filled: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE jobs
            SET filled_slots = filled_slots + 1,
                status = CASE WHEN filled_slots + 1 >= required_workers THEN ? ELSE status END,
                closed_at = CASE WHEN filled_slots + 1 >= required_workers THEN ? ELSE closed_at END
            WHERE id = ? AND status = ? AND filled_slots < required_workers
            RETURNING filled_slots
            "#,
        )
        .bind(&status_closed)
        .bind(now)
        .bind(job_id)
        .bind(&status_open)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        match filled {
            Some(filled_slots) => Ok(filled_slots),
            None => {
                // Guard refused; read the row in the same transaction to say why
                let job: Option<(i32, i32, String)> = sqlx::query_as(
                    "SELECT filled_slots, required_workers, status FROM jobs WHERE id = ?",
                )
                .bind(job_id)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;

                match job {
                    None => Err(DomainError::JobNotFound(job_id.clone()).into()),
                    Some((filled_slots, required_workers, _))
                        if filled_slots >= required_workers =>
                    {
                        Err(DomainError::SlotOverflow(job_id.clone()).into())
                    }
                    Some(_) => Err(DomainError::JobAlreadyClosed(job_id.clone()).into()),
                }
            }
        }
    }

    async fn update_application_status(
        &mut self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        decided_at: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE applications SET status = ?, decided_at = ? WHERE id = ? AND status = ?",
        )
        .bind(next.to_string())
        .bind(decided_at)
        .bind(id)
        .bind(expected.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM applications WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *self.tx)
                    .await
                    .map_err(map_sqlx_error)?;

            return match current {
                None => Err(DomainError::ApplicationNotFound(id.clone()).into()),
                Some(from) => Err(DomainError::InvalidStateTransition {
                    from,
                    to: next.to_string(),
                }
                .into()),
            };
        }
        Ok(())
    }
}
