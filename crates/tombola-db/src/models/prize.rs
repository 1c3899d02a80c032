//! Prizes, stored once per tenant schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tombola_core::{ActivityId, PrizeId, PrizeStatus};

use crate::DbError;

/// A prize tier within an activity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Prize {
    pub prize_id: PrizeId,
    pub activity_id: ActivityId,
    pub prize_name: String,
    /// Lower levels draw later in the ceremony (grand prize is level 1).
    pub prize_level: i32,
    pub gift_name: Option<String>,
    pub gift_image_url: Option<String>,
    /// How many winners this prize admits.
    pub total_quota: i32,
    /// How many have been drawn so far.
    pub drawn_count: i32,
    /// Position in the draw sequence.
    pub draw_order: i32,
    pub status: PrizeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a prize.
#[derive(Debug, Clone)]
pub struct NewPrize {
    pub prize_id: PrizeId,
    pub activity_id: ActivityId,
    pub prize_name: String,
    pub prize_level: i32,
    pub gift_name: Option<String>,
    pub gift_image_url: Option<String>,
    pub total_quota: i32,
    pub draw_order: i32,
}

const PRIZE_COLUMNS: &str = "prize_id, activity_id, prize_name, prize_level, gift_name, \
     gift_image_url, total_quota, drawn_count, draw_order, status, created_at, updated_at";

impl Prize {
    /// Lists an activity's prizes in draw order.
    pub async fn list_by_activity(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
    ) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE activity_id = $1 ORDER BY draw_order ASC"
        ))
        .bind(activity_id)
        .fetch_all(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds one prize.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: &PrizeId,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE prize_id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Inserts a prize, returning the stored row.
    pub async fn insert(conn: &mut PgConnection, new: &NewPrize) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO prizes \
             (prize_id, activity_id, prize_name, prize_level, gift_name, gift_image_url, \
              total_quota, drawn_count, draw_order, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, 'PENDING', NOW(), NOW()) \
             RETURNING {PRIZE_COLUMNS}"
        ))
        .bind(&new.prize_id)
        .bind(&new.activity_id)
        .bind(&new.prize_name)
        .bind(new.prize_level)
        .bind(&new.gift_name)
        .bind(&new.gift_image_url)
        .bind(new.total_quota)
        .bind(new.draw_order)
        .fetch_one(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Updates the editable prize fields, returning the stored row.
    pub async fn update(
        conn: &mut PgConnection,
        id: &PrizeId,
        prize_name: Option<&str>,
        gift_name: Option<&str>,
        total_quota: Option<i32>,
        draw_order: Option<i32>,
    ) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE prizes SET \
             prize_name = COALESCE($2, prize_name), \
             gift_name = COALESCE($3, gift_name), \
             total_quota = COALESCE($4, total_quota), \
             draw_order = COALESCE($5, draw_order), \
             updated_at = NOW() \
             WHERE prize_id = $1 RETURNING {PRIZE_COLUMNS}"
        ))
        .bind(id)
        .bind(prize_name)
        .bind(gift_name)
        .bind(total_quota)
        .bind(draw_order)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)?
        .ok_or_else(|| DbError::NotFound(format!("prize {id}")))
    }

    /// Deletes a prize.
    pub async fn delete(conn: &mut PgConnection, id: &PrizeId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM prizes WHERE prize_id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(DbError::QueryFailed)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("prize {id}")));
        }
        Ok(())
    }

    /// Records one drawn winner against the quota; flips status to DRAWING,
    /// or COMPLETED once the quota is exhausted.
    pub async fn record_draw(conn: &mut PgConnection, id: &PrizeId) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE prizes SET \
             drawn_count = drawn_count + 1, \
             status = CASE WHEN drawn_count + 1 >= total_quota \
                      THEN 'COMPLETED' ELSE 'DRAWING' END, \
             updated_at = NOW() \
             WHERE prize_id = $1 AND drawn_count < total_quota \
             RETURNING {PRIZE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)?
        .ok_or_else(|| DbError::ValidationFailed(format!("prize {id} quota exhausted")))
    }

    /// Resets draw progress for all of an activity's prizes.
    pub async fn reset_for_activity(
        conn: &mut PgConnection,
        activity_id: &ActivityId,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE prizes SET drawn_count = 0, status = 'PENDING', updated_at = NOW() \
             WHERE activity_id = $1",
        )
        .bind(activity_id)
        .execute(conn)
        .await
        .map_err(DbError::QueryFailed)?;
        Ok(())
    }

    /// How many draws remain for this prize.
    #[must_use]
    pub fn remaining_quota(&self) -> i32 {
        (self.total_quota - self.drawn_count).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total: i32, drawn: i32) -> Prize {
        Prize {
            prize_id: "p1".parse().unwrap(),
            activity_id: "a1".parse().unwrap(),
            prize_name: "First Prize".to_string(),
            prize_level: 1,
            gift_name: Some("Laptop".to_string()),
            gift_image_url: None,
            total_quota: total,
            drawn_count: drawn,
            draw_order: 1,
            status: PrizeStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_remaining_quota() {
        assert_eq!(sample(5, 2).remaining_quota(), 3);
        assert_eq!(sample(5, 5).remaining_quota(), 0);
    }

    #[test]
    fn test_remaining_quota_never_negative() {
        assert_eq!(sample(3, 7).remaining_quota(), 0);
    }
}
