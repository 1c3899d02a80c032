//! Lottery activities, stored once per tenant schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tombola_core::{ActivityId, ActivityStatus, UserId};

use crate::DbError;

/// A lottery activity (one draw event).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LotteryActivity {
    pub activity_id: ActivityId,
    pub activity_name: String,
    pub description: Option<String>,
    pub status: ActivityStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Denormalized participant count, maintained on import.
    pub total_participants: i32,
    /// Denormalized winner count, maintained on draw and reset.
    pub total_winners: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

const ACTIVITY_COLUMNS: &str = "activity_id, activity_name, description, status, start_time, \
     end_time, total_participants, total_winners, created_at, updated_at, created_by";

impl LotteryActivity {
    /// Lists all activities, newest first.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM lottery_activities ORDER BY created_at DESC"
        ))
        .fetch_all(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds one activity.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: &ActivityId,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM lottery_activities WHERE activity_id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Inserts a new activity in DRAFT status, returning the stored row.
    pub async fn insert(
        conn: &mut PgConnection,
        id: &ActivityId,
        name: &str,
        description: Option<&str>,
        created_by: Option<&UserId>,
    ) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO lottery_activities \
             (activity_id, activity_name, description, status, total_participants, \
              total_winners, created_at, updated_at, created_by) \
             VALUES ($1, $2, $3, 'DRAFT', 0, 0, NOW(), NOW(), $4) \
             RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(created_by)
        .fetch_one(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Updates name, description, and status, returning the stored row.
    pub async fn update(
        conn: &mut PgConnection,
        id: &ActivityId,
        name: Option<&str>,
        description: Option<&str>,
        status: Option<ActivityStatus>,
    ) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE lottery_activities SET \
             activity_name = COALESCE($2, activity_name), \
             description = COALESCE($3, description), \
             status = COALESCE($4, status), \
             updated_at = NOW() \
             WHERE activity_id = $1 RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(status)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)?
        .ok_or_else(|| DbError::NotFound(format!("activity {id}")))
    }

    /// Counts all activities in the active tenant's schema.
    pub async fn count(conn: &mut PgConnection) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lottery_activities")
            .fetch_one(conn)
            .await
            .map_err(DbError::QueryFailed)?;
        Ok(row.0)
    }

    /// Adjusts the denormalized winner counter.
    pub async fn adjust_winner_count(
        conn: &mut PgConnection,
        id: &ActivityId,
        delta: i32,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE lottery_activities \
             SET total_winners = GREATEST(total_winners + $2, 0), updated_at = NOW() \
             WHERE activity_id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(conn)
        .await
        .map_err(DbError::QueryFailed)?;
        Ok(())
    }

    /// Recomputes the denormalized participant counter after an import.
    pub async fn refresh_participant_count(
        conn: &mut PgConnection,
        id: &ActivityId,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE lottery_activities SET total_participants = \
             (SELECT COUNT(*) FROM participants WHERE activity_id = $1), updated_at = NOW() \
             WHERE activity_id = $1",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(DbError::QueryFailed)?;
        Ok(())
    }

    /// Zeroes the winner counter (activity reset).
    pub async fn reset_winner_count(
        conn: &mut PgConnection,
        id: &ActivityId,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE lottery_activities SET total_winners = 0, updated_at = NOW() \
             WHERE activity_id = $1",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(DbError::QueryFailed)?;
        Ok(())
    }
}
