//! Router configuration for the lottery API.

use crate::handlers::{
    create_activity_handler, create_prize_handler, delete_prize_handler, get_activity_handler,
    import_participants_handler, list_activities_handler, list_participants_handler,
    list_prizes_handler, list_winners_handler, lottery_data_handler, reset_handler,
    save_winner_handler, update_activity_handler, update_prize_handler,
};
use crate::services::LotteryService;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tombola_core::Role;
use tombola_db::TenantPool;
use tombola_tenant::{require_admin, require_auth, AuthContext, GateError};

/// Shared state for the lottery routes.
#[derive(Clone)]
pub struct LotteryApiState {
    /// The lottery service.
    pub service: Arc<LotteryService>,
}

/// Draw operations are open to operators as well as (super-)admins.
async fn require_draw_operator(request: Request, next: Next) -> Result<Response, Response> {
    let Some(ctx) = request.extensions().get::<AuthContext>() else {
        return Err(GateError::Unauthorized.into_response());
    };
    if !matches!(ctx.role, Role::SuperAdmin | Role::Admin | Role::Operator) {
        return Err(GateError::Forbidden(Role::Operator.as_str()).into_response());
    }
    Ok(next.run(request).await)
}

/// Builds the lottery router, mounted under `/api/lottery`.
///
/// Reads require an authenticated caller; configuration writes require the
/// ADMIN role; draw operations additionally admit OPERATOR.
pub fn lottery_router(pool: TenantPool) -> Router {
    let state = LotteryApiState {
        service: Arc::new(LotteryService::new(pool)),
    };

    let reads = Router::new()
        .route("/activities", get(list_activities_handler))
        .route("/activities/:activity_id", get(get_activity_handler))
        .route("/activities/:activity_id/data", get(lottery_data_handler))
        .route("/activities/:activity_id/prizes", get(list_prizes_handler))
        .route(
            "/activities/:activity_id/participants",
            get(list_participants_handler),
        )
        .route("/activities/:activity_id/winners", get(list_winners_handler));

    let admin_writes = Router::new()
        .route("/activities", post(create_activity_handler))
        .route("/activities/:activity_id", put(update_activity_handler))
        .route("/activities/:activity_id/prizes", post(create_prize_handler))
        .route("/prizes/:prize_id", put(update_prize_handler))
        .route("/prizes/:prize_id", delete(delete_prize_handler))
        .route(
            "/activities/:activity_id/participants/import",
            post(import_participants_handler),
        )
        .layer(middleware::from_fn(require_admin));

    let draw_ops = Router::new()
        .route("/activities/:activity_id/winners", post(save_winner_handler))
        .route("/activities/:activity_id/reset", post(reset_handler))
        .layer(middleware::from_fn(require_draw_operator));

    reads
        .merge(admin_writes)
        .merge(draw_ops)
        .layer(middleware::from_fn(require_auth))
        .with_state(state)
}
