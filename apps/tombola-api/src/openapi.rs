//! OpenAPI document and its serving route.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

/// The platform's OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tombola API",
        description = "Multi-tenant lottery platform: one schema per tenant, \
                       routed transparently per authenticated request."
    ),
    paths(
        tombola_api_auth::handlers::login_handler,
        tombola_api_auth::handlers::refresh_handler,
        tombola_api_auth::handlers::logout_handler,
        tombola_api_auth::handlers::me_handler,
        tombola_api_auth::handlers::update_profile_handler,
        tombola_api_tenants::handlers::register_handler,
        tombola_api_tenants::handlers::info_handler,
        tombola_api_tenants::handlers::list_handler,
        tombola_api_tenants::handlers::update_status_handler,
        tombola_api_tenants::handlers::update_quotas_handler,
        tombola_api_lottery::handlers::list_activities_handler,
        tombola_api_lottery::handlers::get_activity_handler,
        tombola_api_lottery::handlers::create_activity_handler,
        tombola_api_lottery::handlers::update_activity_handler,
        tombola_api_lottery::handlers::list_prizes_handler,
        tombola_api_lottery::handlers::create_prize_handler,
        tombola_api_lottery::handlers::update_prize_handler,
        tombola_api_lottery::handlers::delete_prize_handler,
        tombola_api_lottery::handlers::list_participants_handler,
        tombola_api_lottery::handlers::import_participants_handler,
        tombola_api_lottery::handlers::lottery_data_handler,
        tombola_api_lottery::handlers::save_winner_handler,
        tombola_api_lottery::handlers::list_winners_handler,
        tombola_api_lottery::handlers::reset_handler,
    ),
    components(schemas(
        tombola_api_auth::LoginRequest,
        tombola_api_auth::LoginResponse,
        tombola_api_auth::RefreshResponse,
        tombola_api_auth::UpdateProfileRequest,
        tombola_api_auth::UserView,
        tombola_api_tenants::RegisterTenantRequest,
        tombola_api_tenants::TenantView,
        tombola_api_tenants::UpdateStatusRequest,
        tombola_api_tenants::UpdateQuotasRequest,
        tombola_api_lottery::ActivityView,
        tombola_api_lottery::CreateActivityRequest,
        tombola_api_lottery::UpdateActivityRequest,
        tombola_api_lottery::CreatePrizeRequest,
        tombola_api_lottery::UpdatePrizeRequest,
        tombola_api_lottery::ParticipantImport,
        tombola_api_lottery::ImportParticipantsRequest,
        tombola_api_lottery::SaveWinnerRequest,
        tombola_api_lottery::WinnerView,
        tombola_api_lottery::LotteryData,
        tombola_api_lottery::ResetResponse,
        tombola_api_lottery::handlers::ImportResponse,
        tombola_db::models::Prize,
        tombola_db::models::Participant,
        tombola_core::TenantId,
        tombola_core::UserId,
        tombola_core::ActivityId,
        tombola_core::PrizeId,
        tombola_core::ParticipantId,
        tombola_core::RecordId,
        tombola_core::Role,
        tombola_core::TenantStatus,
        tombola_core::UserStatus,
        tombola_core::ActivityStatus,
        tombola_core::PrizeStatus,
    ))
)]
pub struct ApiDoc;

/// Serves the OpenAPI document as JSON.
pub fn docs_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
