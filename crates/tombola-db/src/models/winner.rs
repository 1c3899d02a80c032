//! Winner records, stored once per tenant schema.
//!
//! Denormalized names are stored alongside the foreign keys so the draw
//! history remains readable even if participants or prizes are edited later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tombola_core::{ActivityId, ParticipantId, PrizeId, RecordId, UserId};

use crate::DbError;

/// One drawn winner.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub record_id: RecordId,
    pub activity_id: ActivityId,
    pub prize_id: PrizeId,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub prize_name: String,
    pub gift_name: Option<String>,
    pub draw_time: DateTime<Utc>,
    /// Ordinal of this draw within the prize.
    pub draw_sequence: i32,
    pub operator_id: Option<UserId>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record a winner.
#[derive(Debug, Clone)]
pub struct NewWinnerRecord {
    pub record_id: RecordId,
    pub activity_id: ActivityId,
    pub prize_id: PrizeId,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub prize_name: String,
    pub gift_name: Option<String>,
    pub draw_sequence: i32,
    pub operator_id: Option<UserId>,
    pub remarks: Option<String>,
}

const WINNER_COLUMNS: &str = "record_id, activity_id, prize_id, participant_id, \
     participant_name, prize_name, gift_name, draw_time, draw_sequence, operator_id, remarks, \
     created_at";

impl WinnerRecord {
    /// Lists an activity's winner records in draw order.
    pub async fn list_by_activity(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
    ) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {WINNER_COLUMNS} FROM winner_records \
             WHERE activity_id = $1 ORDER BY draw_time ASC"
        ))
        .bind(activity_id)
        .fetch_all(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Inserts a winner record, returning the stored row.
    pub async fn insert(conn: &mut PgConnection, new: &NewWinnerRecord) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO winner_records \
             (record_id, activity_id, prize_id, participant_id, participant_name, prize_name, \
              gift_name, draw_time, draw_sequence, operator_id, remarks, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8, $9, $10, NOW()) \
             RETURNING {WINNER_COLUMNS}"
        ))
        .bind(&new.record_id)
        .bind(&new.activity_id)
        .bind(&new.prize_id)
        .bind(&new.participant_id)
        .bind(&new.participant_name)
        .bind(&new.prize_name)
        .bind(&new.gift_name)
        .bind(new.draw_sequence)
        .bind(&new.operator_id)
        .bind(&new.remarks)
        .fetch_one(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Next draw sequence number for a prize.
    pub async fn next_sequence(
        conn: &mut PgConnection,
        prize_id: &PrizeId,
    ) -> Result<i32, DbError> {
        let row: (Option<i32>,) =
            sqlx::query_as("SELECT MAX(draw_sequence) FROM winner_records WHERE prize_id = $1")
                .bind(prize_id)
                .fetch_one(conn)
                .await
                .map_err(DbError::QueryFailed)?;
        Ok(row.0.unwrap_or(0) + 1)
    }

    /// Whether a participant has already won in this activity.
    pub async fn participant_has_won(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
        participant_id: &ParticipantId,
    ) -> Result<bool, DbError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM winner_records \
             WHERE activity_id = $1 AND participant_id = $2)",
        )
        .bind(activity_id)
        .bind(participant_id)
        .fetch_one(conn)
        .await
        .map_err(DbError::QueryFailed)?;
        Ok(row.0)
    }

    /// Deletes all of an activity's winner records (reset), returning the
    /// number removed.
    pub async fn delete_for_activity(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM winner_records WHERE activity_id = $1")
            .bind(activity_id)
            .execute(conn)
            .await
            .map_err(DbError::QueryFailed)?;
        Ok(result.rows_affected())
    }
}
