//! HTTP handlers for the lottery API.

use crate::error::LotteryApiError;
use crate::models::{
    ActivityView, CreateActivityRequest, CreatePrizeRequest, ImportParticipantsRequest,
    LotteryData, ResetResponse, SaveWinnerRequest, UpdateActivityRequest, UpdatePrizeRequest,
    WinnerView,
};
use crate::router::LotteryApiState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tombola_core::{ActivityId, PrizeId};
use tombola_db::models::{Participant, Prize};
use tombola_tenant::AuthContext;
use validator::Validate;

fn validation_errors(e: &validator::ValidationErrors) -> String {
    e.field_errors()
        .values()
        .flat_map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(ToString::to_string))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_activity_id(raw: &str) -> Result<ActivityId, LotteryApiError> {
    raw.parse()
        .map_err(|_| LotteryApiError::Validation("invalid activity id".to_string()))
}

fn parse_prize_id(raw: &str) -> Result<PrizeId, LotteryApiError> {
    raw.parse()
        .map_err(|_| LotteryApiError::Validation("invalid prize id".to_string()))
}

/// Result of a participant import.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
}

// ── Activities ──────────────────────────────────────────────────────────

/// List all activities.
#[utoipa::path(
    get,
    path = "/api/lottery/activities",
    responses((status = 200, description = "Activities", body = [ActivityView])),
    tag = "Lottery"
)]
pub async fn list_activities_handler(
    State(state): State<LotteryApiState>,
) -> Result<Json<Vec<ActivityView>>, LotteryApiError> {
    Ok(Json(state.service.list_activities().await?))
}

/// One activity.
#[utoipa::path(
    get,
    path = "/api/lottery/activities/{activity_id}",
    params(("activity_id" = String, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity", body = ActivityView),
        (status = 404, description = "Activity not found"),
    ),
    tag = "Lottery"
)]
pub async fn get_activity_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityView>, LotteryApiError> {
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.get_activity(&id).await?))
}

/// Create an activity.
#[utoipa::path(
    post,
    path = "/api/lottery/activities",
    request_body = CreateActivityRequest,
    responses((status = 201, description = "Created", body = ActivityView)),
    tag = "Lottery"
)]
pub async fn create_activity_handler(
    State(state): State<LotteryApiState>,
    ctx: AuthContext,
    Json(request): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityView>), LotteryApiError> {
    request
        .validate()
        .map_err(|e| LotteryApiError::Validation(validation_errors(&e)))?;
    let activity = state.service.create_activity(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// Update an activity.
#[utoipa::path(
    put,
    path = "/api/lottery/activities/{activity_id}",
    params(("activity_id" = String, Path, description = "Activity ID")),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Updated", body = ActivityView),
        (status = 404, description = "Activity not found"),
    ),
    tag = "Lottery"
)]
pub async fn update_activity_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
    Json(request): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityView>, LotteryApiError> {
    request
        .validate()
        .map_err(|e| LotteryApiError::Validation(validation_errors(&e)))?;
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.update_activity(&id, &request).await?))
}

// ── Prizes ──────────────────────────────────────────────────────────────

/// List an activity's prizes in draw order.
#[utoipa::path(
    get,
    path = "/api/lottery/activities/{activity_id}/prizes",
    params(("activity_id" = String, Path, description = "Activity ID")),
    responses((status = 200, description = "Prizes")),
    tag = "Lottery"
)]
pub async fn list_prizes_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
) -> Result<Json<Vec<Prize>>, LotteryApiError> {
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.list_prizes(&id).await?))
}

/// Create a prize under an activity.
#[utoipa::path(
    post,
    path = "/api/lottery/activities/{activity_id}/prizes",
    params(("activity_id" = String, Path, description = "Activity ID")),
    request_body = CreatePrizeRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 404, description = "Activity not found"),
    ),
    tag = "Lottery"
)]
pub async fn create_prize_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
    Json(request): Json<CreatePrizeRequest>,
) -> Result<(StatusCode, Json<Prize>), LotteryApiError> {
    request
        .validate()
        .map_err(|e| LotteryApiError::Validation(validation_errors(&e)))?;
    let id = parse_activity_id(&activity_id)?;
    let prize = state.service.create_prize(&id, &request).await?;
    Ok((StatusCode::CREATED, Json(prize)))
}

/// Update a prize.
#[utoipa::path(
    put,
    path = "/api/lottery/prizes/{prize_id}",
    params(("prize_id" = String, Path, description = "Prize ID")),
    request_body = UpdatePrizeRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Prize not found"),
    ),
    tag = "Lottery"
)]
pub async fn update_prize_handler(
    State(state): State<LotteryApiState>,
    Path(prize_id): Path<String>,
    Json(request): Json<UpdatePrizeRequest>,
) -> Result<Json<Prize>, LotteryApiError> {
    request
        .validate()
        .map_err(|e| LotteryApiError::Validation(validation_errors(&e)))?;
    let id = parse_prize_id(&prize_id)?;
    Ok(Json(state.service.update_prize(&id, &request).await?))
}

/// Delete a prize.
#[utoipa::path(
    delete,
    path = "/api/lottery/prizes/{prize_id}",
    params(("prize_id" = String, Path, description = "Prize ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Prize not found"),
    ),
    tag = "Lottery"
)]
pub async fn delete_prize_handler(
    State(state): State<LotteryApiState>,
    Path(prize_id): Path<String>,
) -> Result<StatusCode, LotteryApiError> {
    let id = parse_prize_id(&prize_id)?;
    state.service.delete_prize(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Participants ────────────────────────────────────────────────────────

/// List an activity's participants.
#[utoipa::path(
    get,
    path = "/api/lottery/activities/{activity_id}/participants",
    params(("activity_id" = String, Path, description = "Activity ID")),
    responses((status = 200, description = "Participants")),
    tag = "Lottery"
)]
pub async fn list_participants_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
) -> Result<Json<Vec<Participant>>, LotteryApiError> {
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.list_participants(&id).await?))
}

/// Bulk-import participants into an activity.
#[utoipa::path(
    post,
    path = "/api/lottery/activities/{activity_id}/participants/import",
    params(("activity_id" = String, Path, description = "Activity ID")),
    request_body = ImportParticipantsRequest,
    responses(
        (status = 200, description = "Import result", body = ImportResponse),
        (status = 404, description = "Activity not found"),
    ),
    tag = "Lottery"
)]
pub async fn import_participants_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
    Json(request): Json<ImportParticipantsRequest>,
) -> Result<Json<ImportResponse>, LotteryApiError> {
    request
        .validate()
        .map_err(|e| LotteryApiError::Validation(validation_errors(&e)))?;
    let id = parse_activity_id(&activity_id)?;
    let imported = state.service.import_participants(&id, &request).await?;
    Ok(Json(ImportResponse { imported }))
}

// ── Draws ───────────────────────────────────────────────────────────────

/// The aggregate draw-screen payload.
#[utoipa::path(
    get,
    path = "/api/lottery/activities/{activity_id}/data",
    params(("activity_id" = String, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Draw data", body = LotteryData),
        (status = 404, description = "Activity not found"),
    ),
    tag = "Lottery"
)]
pub async fn lottery_data_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
) -> Result<Json<LotteryData>, LotteryApiError> {
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.lottery_data(&id).await?))
}

/// Record one drawn winner.
#[utoipa::path(
    post,
    path = "/api/lottery/activities/{activity_id}/winners",
    params(("activity_id" = String, Path, description = "Activity ID")),
    request_body = SaveWinnerRequest,
    responses(
        (status = 201, description = "Winner recorded", body = WinnerView),
        (status = 404, description = "Activity, prize, or participant not found"),
        (status = 409, description = "Already won or quota exhausted"),
    ),
    tag = "Lottery"
)]
pub async fn save_winner_handler(
    State(state): State<LotteryApiState>,
    ctx: AuthContext,
    Path(activity_id): Path<String>,
    Json(request): Json<SaveWinnerRequest>,
) -> Result<(StatusCode, Json<WinnerView>), LotteryApiError> {
    request
        .validate()
        .map_err(|e| LotteryApiError::Validation(validation_errors(&e)))?;
    let id = parse_activity_id(&activity_id)?;
    let winner = state.service.save_winner(&ctx, &id, &request).await?;
    Ok((StatusCode::CREATED, Json(winner)))
}

/// List an activity's winners.
#[utoipa::path(
    get,
    path = "/api/lottery/activities/{activity_id}/winners",
    params(("activity_id" = String, Path, description = "Activity ID")),
    responses((status = 200, description = "Winners", body = [WinnerView])),
    tag = "Lottery"
)]
pub async fn list_winners_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
) -> Result<Json<Vec<WinnerView>>, LotteryApiError> {
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.winners(&id).await?))
}

/// Reset an activity's draw results.
#[utoipa::path(
    post,
    path = "/api/lottery/activities/{activity_id}/reset",
    params(("activity_id" = String, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Reset result", body = ResetResponse),
        (status = 404, description = "Activity not found"),
    ),
    tag = "Lottery"
)]
pub async fn reset_handler(
    State(state): State<LotteryApiState>,
    Path(activity_id): Path<String>,
) -> Result<Json<ResetResponse>, LotteryApiError> {
    let id = parse_activity_id(&activity_id)?;
    Ok(Json(state.service.reset(&id).await?))
}
