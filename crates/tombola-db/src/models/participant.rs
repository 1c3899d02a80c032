//! Draw participants, stored once per tenant schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tombola_core::{ActivityId, ParticipantId};

use crate::DbError;

/// Someone eligible to win in an activity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Participant {
    pub participant_id: ParticipantId,
    pub activity_id: ActivityId,
    pub name: String,
    pub employee_no: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_winner: bool,
    /// Batch tag of the import that created this row.
    pub import_batch: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to import a participant.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub participant_id: ParticipantId,
    pub activity_id: ActivityId,
    pub name: String,
    pub employee_no: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub import_batch: Option<String>,
}

const PARTICIPANT_COLUMNS: &str = "participant_id, activity_id, name, employee_no, department, \
     phone, email, is_winner, import_batch, created_at";

impl Participant {
    /// Lists an activity's participants.
    pub async fn list_by_activity(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
    ) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE activity_id = $1 ORDER BY created_at ASC"
        ))
        .bind(activity_id)
        .fetch_all(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds one participant.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: &ParticipantId,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE participant_id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Inserts one imported participant.
    pub async fn insert(conn: &mut PgConnection, new: &NewParticipant) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO participants \
             (participant_id, activity_id, name, employee_no, department, phone, email, \
              is_winner, import_batch, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, NOW()) \
             RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(&new.participant_id)
        .bind(&new.activity_id)
        .bind(&new.name)
        .bind(&new.employee_no)
        .bind(&new.department)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.import_batch)
        .fetch_one(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Marks a participant as having won.
    pub async fn mark_winner(conn: &mut PgConnection, id: &ParticipantId) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE participants SET is_winner = TRUE WHERE participant_id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(DbError::QueryFailed)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("participant {id}")));
        }
        Ok(())
    }

    /// Clears every winner flag for an activity (reset).
    pub async fn clear_winner_flags(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE participants SET is_winner = FALSE WHERE activity_id = $1")
            .bind(activity_id)
            .execute(conn)
            .await
            .map_err(DbError::QueryFailed)?;
        Ok(())
    }
}
