//! [`SessionRecordStore`] backed by Postgres.

use async_trait::async_trait;
use faceframe_core::services::{SessionRecordStore, StoreError};
use faceframe_core::session::{SessionField, SessionId, SessionRecord};

use crate::repositories::SessionRecordRepo;
use crate::DbPool;

/// Record store gateway over a shared connection pool.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SessionRecordStore for PgSessionStore {
    async fn create_or_insert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let row = SessionRecordRepo::create(&self.pool, record)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        tracing::debug!(session_id = %record.session_id, row_id = row.id, "Session record stored");
        Ok(())
    }

    async fn update_field(
        &self,
        session_id: SessionId,
        field: SessionField,
        value: &str,
    ) -> Result<(), StoreError> {
        let touched = SessionRecordRepo::update_field(&self.pool, session_id, field, value)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if touched == 0 {
            return Err(StoreError::NotFound(session_id));
        }
        Ok(())
    }

    async fn read_field(
        &self,
        session_id: SessionId,
        field: SessionField,
    ) -> Result<Option<String>, StoreError> {
        SessionRecordRepo::read_field(&self.pool, session_id, field)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}
