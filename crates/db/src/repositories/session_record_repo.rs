//! Repository for the `event_output_images` table.

use sqlx::PgPool;
use faceframe_core::session::{SessionField, SessionId, SessionRecord};

use crate::models::session_record::SessionRow;

/// Column list for `event_output_images` queries.
const COLUMNS: &str = "\
    id, unique_id, image_url, gender, character_image, name, email, \
    event_id, user_id, credits_used, output, created_at, updated_at";

/// Provides query operations for kiosk session records.
pub struct SessionRecordRepo;

impl SessionRecordRepo {
    // ── Queries ──────────────────────────────────────────────────────

    /// Insert the initial row for a session, returning it.
    ///
    /// Re-inserting an existing session refreshes its input columns and
    /// leaves `output` untouched.
    pub async fn create(pool: &PgPool, record: &SessionRecord) -> Result<SessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_output_images \
                (unique_id, image_url, gender, character_image, name, email, \
                 event_id, user_id, credits_used) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (unique_id) DO UPDATE SET \
                image_url = EXCLUDED.image_url, \
                gender = EXCLUDED.gender, \
                character_image = EXCLUDED.character_image, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(record.session_id.as_uuid())
            .bind(&record.image_url)
            .bind(record.gender.as_str())
            .bind(&record.character_image)
            .bind(record.attribution.user_name.as_deref())
            .bind(record.attribution.user_email.as_deref())
            .bind(&record.attribution.event_id)
            .bind(&record.attribution.user_id)
            .bind(&record.attribution.credits_used)
            .fetch_one(pool)
            .await
    }

    /// Read a single mutable column. `None` if the row or the value is absent.
    pub async fn read_field(
        pool: &PgPool,
        session_id: SessionId,
        field: SessionField,
    ) -> Result<Option<String>, sqlx::Error> {
        let query = select_field_sql(field);
        let row: Option<(Option<String>,)> = sqlx::query_as(&query)
            .bind(session_id.as_uuid())
            .fetch_optional(pool)
            .await?;
        Ok(row.and_then(|(value,)| value))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Overwrite a single mutable column. Last write wins.
    ///
    /// Returns the number of rows touched (0 when the session is unknown).
    pub async fn update_field(
        pool: &PgPool,
        session_id: SessionId,
        field: SessionField,
        value: &str,
    ) -> Result<u64, sqlx::Error> {
        let query = update_field_sql(field);
        let result = sqlx::query(&query)
            .bind(session_id.as_uuid())
            .bind(value)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn select_field_sql(field: SessionField) -> String {
    format!(
        "SELECT {} FROM event_output_images WHERE unique_id = $1",
        field.column()
    )
}

fn update_field_sql(field: SessionField) -> String {
    format!(
        "UPDATE event_output_images SET {} = $2, updated_at = NOW() WHERE unique_id = $1",
        field.column()
    )
}
