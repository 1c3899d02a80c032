//! Lottery service: activities, prizes, participants, and draws.
//!
//! Multi-statement operations (winner save, activity reset, bulk import)
//! run in a transaction begun through the statement router, so every
//! statement of the unit executes on one connection already pointed at the
//! active tenant's schema.

use crate::error::LotteryApiError;
use crate::models::{
    ActivityView, CreateActivityRequest, CreatePrizeRequest, ImportParticipantsRequest,
    LotteryData, ResetResponse, SaveWinnerRequest, UpdateActivityRequest, UpdatePrizeRequest,
    WinnerView,
};
use tombola_core::{ActivityId, ParticipantId, PrizeId, RecordId};
use tombola_db::models::{
    LotteryActivity, NewParticipant, NewWinnerRecord, Participant, Prize, WinnerRecord,
};
use tombola_db::{DbError, TenantPool};
use tombola_tenant::AuthContext;

/// Orchestrates all lottery operations for the active tenant.
#[derive(Clone)]
pub struct LotteryService {
    pool: TenantPool,
}

impl LotteryService {
    /// Creates the service over the routed pool.
    #[must_use]
    pub fn new(pool: TenantPool) -> Self {
        Self { pool }
    }

    // ── Activities ───────────────────────────────────────────────────────

    /// Lists the tenant's activities, newest first.
    pub async fn list_activities(&self) -> Result<Vec<ActivityView>, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        let activities = LotteryActivity::list(&mut conn).await?;
        Ok(activities.into_iter().map(ActivityView::from).collect())
    }

    /// One activity.
    pub async fn get_activity(&self, id: &ActivityId) -> Result<ActivityView, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        LotteryActivity::find_by_id(&mut conn, id)
            .await?
            .map(ActivityView::from)
            .ok_or_else(|| LotteryApiError::NotFound(format!("activity {id}")))
    }

    /// Creates an activity in DRAFT status.
    pub async fn create_activity(
        &self,
        ctx: &AuthContext,
        request: &CreateActivityRequest,
    ) -> Result<ActivityView, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        let activity = LotteryActivity::insert(
            &mut conn,
            &ActivityId::generate(),
            &request.activity_name,
            request.description.as_deref(),
            Some(&ctx.subject),
        )
        .await?;
        tracing::info!(
            activity_id = %activity.activity_id,
            tenant_id = %ctx.tenant_id,
            "activity created"
        );
        Ok(ActivityView::from(activity))
    }

    /// Updates an activity's editable fields.
    pub async fn update_activity(
        &self,
        id: &ActivityId,
        request: &UpdateActivityRequest,
    ) -> Result<ActivityView, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        let activity = LotteryActivity::update(
            &mut conn,
            id,
            request.activity_name.as_deref(),
            request.description.as_deref(),
            request.status,
        )
        .await
        .map_err(not_found_or_db)?;
        Ok(ActivityView::from(activity))
    }

    // ── Prizes ───────────────────────────────────────────────────────────

    /// Lists an activity's prizes in draw order.
    pub async fn list_prizes(&self, activity_id: &ActivityId) -> Result<Vec<Prize>, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        Ok(Prize::list_by_activity(&mut conn, activity_id).await?)
    }

    /// Creates a prize under an activity.
    pub async fn create_prize(
        &self,
        activity_id: &ActivityId,
        request: &CreatePrizeRequest,
    ) -> Result<Prize, LotteryApiError> {
        let mut conn = self.pool.conn().await?;

        LotteryActivity::find_by_id(&mut conn, activity_id)
            .await?
            .ok_or_else(|| LotteryApiError::NotFound(format!("activity {activity_id}")))?;

        let prize = Prize::insert(
            &mut conn,
            &tombola_db::models::NewPrize {
                prize_id: PrizeId::generate(),
                activity_id: activity_id.clone(),
                prize_name: request.prize_name.clone(),
                prize_level: request.prize_level.unwrap_or(1),
                gift_name: request.gift_name.clone(),
                gift_image_url: request.gift_image_url.clone(),
                total_quota: request.total_quota,
                draw_order: request.draw_order,
            },
        )
        .await?;
        Ok(prize)
    }

    /// Updates a prize's editable fields.
    pub async fn update_prize(
        &self,
        id: &PrizeId,
        request: &UpdatePrizeRequest,
    ) -> Result<Prize, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        Prize::update(
            &mut conn,
            id,
            request.prize_name.as_deref(),
            request.gift_name.as_deref(),
            request.total_quota,
            request.draw_order,
        )
        .await
        .map_err(not_found_or_db)
    }

    /// Deletes a prize.
    pub async fn delete_prize(&self, id: &PrizeId) -> Result<(), LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        Prize::delete(&mut conn, id).await.map_err(not_found_or_db)
    }

    // ── Participants ─────────────────────────────────────────────────────

    /// Lists an activity's participants.
    pub async fn list_participants(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Vec<Participant>, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        Ok(Participant::list_by_activity(&mut conn, activity_id).await?)
    }

    /// Bulk-imports participants into an activity.
    ///
    /// One transaction: all rows land, the denormalized participant counter
    /// is refreshed, or nothing happens.
    pub async fn import_participants(
        &self,
        activity_id: &ActivityId,
        request: &ImportParticipantsRequest,
    ) -> Result<usize, LotteryApiError> {
        let mut tx = self.pool.begin().await?;

        LotteryActivity::find_by_id(&mut tx, activity_id)
            .await?
            .ok_or_else(|| LotteryApiError::NotFound(format!("activity {activity_id}")))?;

        let batch = RecordId::generate().to_string();
        for row in &request.participants {
            Participant::insert(
                &mut tx,
                &NewParticipant {
                    participant_id: ParticipantId::generate(),
                    activity_id: activity_id.clone(),
                    name: row.name.clone(),
                    employee_no: row.employee_no.clone(),
                    department: row.department.clone(),
                    phone: row.phone.clone(),
                    email: row.email.clone(),
                    import_batch: Some(batch.clone()),
                },
            )
            .await?;
        }

        LotteryActivity::refresh_participant_count(&mut tx, activity_id).await?;
        tx.commit().await.map_err(DbError::QueryFailed)?;

        tracing::info!(
            activity_id = %activity_id,
            imported = request.participants.len(),
            batch = %batch,
            "participants imported"
        );
        Ok(request.participants.len())
    }

    // ── Draws ────────────────────────────────────────────────────────────

    /// The aggregate payload a draw screen renders from.
    pub async fn lottery_data(
        &self,
        activity_id: &ActivityId,
    ) -> Result<LotteryData, LotteryApiError> {
        let mut conn = self.pool.conn().await?;

        let activity = LotteryActivity::find_by_id(&mut conn, activity_id)
            .await?
            .ok_or_else(|| LotteryApiError::NotFound(format!("activity {activity_id}")))?;
        let prizes = Prize::list_by_activity(&mut conn, activity_id).await?;
        let participants = Participant::list_by_activity(&mut conn, activity_id).await?;
        let records = WinnerRecord::list_by_activity(&mut conn, activity_id).await?;

        Ok(LotteryData {
            activity: ActivityView::from(activity),
            prizes,
            participants,
            winners: LotteryData::group_winners(records),
        })
    }

    /// Records one drawn winner.
    ///
    /// Transactional: the quota decrement, the winner record, the
    /// participant flag, and the activity counter move together.
    pub async fn save_winner(
        &self,
        ctx: &AuthContext,
        activity_id: &ActivityId,
        request: &SaveWinnerRequest,
    ) -> Result<WinnerView, LotteryApiError> {
        let mut tx = self.pool.begin().await?;

        let participant = Participant::find_by_id(&mut tx, &request.participant_id)
            .await?
            .ok_or_else(|| {
                LotteryApiError::NotFound(format!("participant {}", request.participant_id))
            })?;

        if WinnerRecord::participant_has_won(&mut tx, activity_id, &request.participant_id).await? {
            return Err(LotteryApiError::AlreadyWon);
        }

        let prize = Prize::find_by_id(&mut tx, &request.prize_id)
            .await?
            .ok_or_else(|| LotteryApiError::NotFound(format!("prize {}", request.prize_id)))?;

        let prize = Prize::record_draw(&mut tx, &prize.prize_id)
            .await
            .map_err(|e| match e {
                DbError::ValidationFailed(_) => LotteryApiError::QuotaExhausted,
                other => LotteryApiError::Database(other),
            })?;

        let sequence = WinnerRecord::next_sequence(&mut tx, &prize.prize_id).await?;

        let record = WinnerRecord::insert(
            &mut tx,
            &NewWinnerRecord {
                record_id: RecordId::generate(),
                activity_id: activity_id.clone(),
                prize_id: prize.prize_id.clone(),
                participant_id: participant.participant_id.clone(),
                participant_name: participant.name.clone(),
                prize_name: prize.prize_name.clone(),
                gift_name: prize.gift_name.clone(),
                draw_sequence: sequence,
                operator_id: Some(ctx.subject.clone()),
                remarks: request.remarks.clone(),
            },
        )
        .await?;

        Participant::mark_winner(&mut tx, &participant.participant_id).await?;
        LotteryActivity::adjust_winner_count(&mut tx, activity_id, 1).await?;

        tx.commit().await.map_err(DbError::QueryFailed)?;

        tracing::info!(
            activity_id = %activity_id,
            prize_id = %prize.prize_id,
            participant_id = %participant.participant_id,
            sequence,
            "winner recorded"
        );
        Ok(WinnerView::from(record))
    }

    /// Lists an activity's winners in draw order.
    pub async fn winners(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Vec<WinnerView>, LotteryApiError> {
        let mut conn = self.pool.conn().await?;
        let records = WinnerRecord::list_by_activity(&mut conn, activity_id).await?;
        Ok(records.into_iter().map(WinnerView::from).collect())
    }

    /// Wipes an activity's draw results so it can be run again.
    pub async fn reset(&self, activity_id: &ActivityId) -> Result<ResetResponse, LotteryApiError> {
        let mut tx = self.pool.begin().await?;

        LotteryActivity::find_by_id(&mut tx, activity_id)
            .await?
            .ok_or_else(|| LotteryApiError::NotFound(format!("activity {activity_id}")))?;

        let removed = WinnerRecord::delete_for_activity(&mut tx, activity_id).await?;
        Participant::clear_winner_flags(&mut tx, activity_id).await?;
        Prize::reset_for_activity(&mut tx, activity_id).await?;
        LotteryActivity::reset_winner_count(&mut tx, activity_id).await?;

        tx.commit().await.map_err(DbError::QueryFailed)?;

        tracing::info!(activity_id = %activity_id, removed, "activity reset");
        Ok(ResetResponse {
            removed_records: removed,
        })
    }
}

fn not_found_or_db(err: DbError) -> LotteryApiError {
    match err {
        DbError::NotFound(what) => LotteryApiError::NotFound(what),
        other => LotteryApiError::Database(other),
    }
}
