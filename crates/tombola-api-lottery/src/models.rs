//! Request and response bodies for the lottery API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tombola_core::{
    ActivityId, ActivityStatus, ParticipantId, PrizeId, RecordId,
};
use tombola_db::models::{LotteryActivity, Participant, Prize, WinnerRecord};
use utoipa::ToSchema;
use validator::Validate;

/// Create a new activity.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 255, message = "activity name is required"))]
    pub activity_name: String,

    #[validate(length(max = 4096, message = "description too long"))]
    pub description: Option<String>,
}

/// Update an activity.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 255, message = "activity name must not be empty"))]
    pub activity_name: Option<String>,

    #[validate(length(max = 4096, message = "description too long"))]
    pub description: Option<String>,

    pub status: Option<ActivityStatus>,
}

/// An activity, as exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityView {
    pub activity_id: ActivityId,
    pub activity_name: String,
    pub description: Option<String>,
    pub status: ActivityStatus,
    pub total_participants: i32,
    pub total_winners: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LotteryActivity> for ActivityView {
    fn from(activity: LotteryActivity) -> Self {
        Self {
            activity_id: activity.activity_id,
            activity_name: activity.activity_name,
            description: activity.description,
            status: activity.status,
            total_participants: activity.total_participants,
            total_winners: activity.total_winners,
            created_at: activity.created_at,
            updated_at: activity.updated_at,
        }
    }
}

/// Create a prize within an activity.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePrizeRequest {
    #[validate(length(min = 1, max = 255, message = "prize name is required"))]
    pub prize_name: String,

    #[validate(range(min = 1, max = 100, message = "prize level out of range"))]
    pub prize_level: Option<i32>,

    #[validate(length(max = 255, message = "gift name too long"))]
    pub gift_name: Option<String>,

    #[validate(length(max = 512, message = "gift image url too long"))]
    pub gift_image_url: Option<String>,

    #[validate(range(min = 1, max = 10_000, message = "quota out of range"))]
    pub total_quota: i32,

    #[validate(range(min = 1, max = 1_000, message = "draw order out of range"))]
    pub draw_order: i32,
}

/// Update a prize.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePrizeRequest {
    #[validate(length(min = 1, max = 255, message = "prize name must not be empty"))]
    pub prize_name: Option<String>,

    #[validate(length(max = 255, message = "gift name too long"))]
    pub gift_name: Option<String>,

    #[validate(range(min = 1, max = 10_000, message = "quota out of range"))]
    pub total_quota: Option<i32>,

    #[validate(range(min = 1, max = 1_000, message = "draw order out of range"))]
    pub draw_order: Option<i32>,
}

/// One participant row in a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ParticipantImport {
    #[validate(length(min = 1, max = 128, message = "participant name is required"))]
    pub name: String,

    #[validate(length(max = 64, message = "employee number too long"))]
    pub employee_no: Option<String>,

    #[validate(length(max = 128, message = "department too long"))]
    pub department: Option<String>,

    #[validate(length(max = 32, message = "phone number too long"))]
    pub phone: Option<String>,

    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
}

/// Bulk participant import.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ImportParticipantsRequest {
    #[validate(
        length(min = 1, max = 10_000, message = "import must contain 1-10000 rows"),
        nested
    )]
    pub participants: Vec<ParticipantImport>,
}

/// Record one drawn winner.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveWinnerRequest {
    pub prize_id: PrizeId,
    pub participant_id: ParticipantId,

    #[validate(length(max = 1024, message = "remarks too long"))]
    pub remarks: Option<String>,
}

/// A winner record, as exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerView {
    pub record_id: RecordId,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub prize_name: String,
    pub gift_name: Option<String>,
    pub draw_sequence: i32,
    pub draw_time: DateTime<Utc>,
}

impl From<WinnerRecord> for WinnerView {
    fn from(record: WinnerRecord) -> Self {
        Self {
            record_id: record.record_id,
            participant_id: record.participant_id,
            participant_name: record.participant_name,
            prize_name: record.prize_name,
            gift_name: record.gift_name,
            draw_sequence: record.draw_sequence,
            draw_time: record.draw_time,
        }
    }
}

/// The aggregate payload a draw screen renders from.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LotteryData {
    pub activity: ActivityView,
    pub prizes: Vec<Prize>,
    pub participants: Vec<Participant>,
    /// Winner records grouped by prize name, in draw order within each.
    pub winners: BTreeMap<String, Vec<WinnerView>>,
}

impl LotteryData {
    /// Groups winner records under their prize names.
    #[must_use]
    pub fn group_winners(records: Vec<WinnerRecord>) -> BTreeMap<String, Vec<WinnerView>> {
        let mut grouped: BTreeMap<String, Vec<WinnerView>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.prize_name.clone())
                .or_default()
                .push(WinnerView::from(record));
        }
        grouped
    }
}

/// Result of resetting an activity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetResponse {
    /// Number of winner records removed.
    pub removed_records: u64,
}
