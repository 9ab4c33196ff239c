//! PostgreSQL Session Store
//!
//! `candhis_session` holds exactly one row. The store is update-only:
//! the row is seeded out of band (`seed`) and every refresh overwrites it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::repository::SessionStore;
use crate::domain::session_credential::SessionCredential;
use crate::error::{WavesError, WavesResult};

/// PostgreSQL-backed session store
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the initial row if the table is empty
    ///
    /// Returns `false` when a row already existed and nothing was written.
    pub async fn seed(&self, credential: &SessionCredential) -> WavesResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO candhis_session (id, created_at)
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM candhis_session)
            "#,
        )
        .bind(credential.id())
        .bind(credential.created_at())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(seeded = inserted > 0, "Seeded session store");

        Ok(inserted > 0)
    }
}

impl SessionStore for PgSessionStore {
    async fn get(&self) -> WavesResult<SessionCredential> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, created_at
            FROM candhis_session
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| WavesError::NotFound("no session ID found in database".into()))?;

        row.into_credential()
    }

    async fn update(&self, credential: &SessionCredential) -> WavesResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE candhis_session
            SET id = $1, created_at = $2
            "#,
        )
        .bind(credential.id())
        .bind(credential.created_at())
        .execute(&mut *tx)
        .await;

        let affected = match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed session update failed");
                }
                return Err(e.into());
            }
        };

        if affected == 0 {
            tx.rollback().await?;
            return Err(WavesError::NotFound("no session found to update".into()));
        }

        tx.commit().await?;

        tracing::info!(created_at = %credential.created_at(), "Session credential updated");
        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_credential(self) -> WavesResult<SessionCredential> {
        Ok(SessionCredential::with_created_at(self.id, self.created_at)?)
    }
}
