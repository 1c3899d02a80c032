//! # tombola-api-lottery
//!
//! Lottery endpoints: activities, prizes, participants, and winner records.
//!
//! Everything in this crate is tenant-scoped and schema-agnostic: handlers
//! and services never see a schema name. They acquire connections through
//! the statement router, which points each one at the schema of whichever
//! tenant the authenticated request belongs to.

mod error;
pub mod handlers;
mod models;
mod router;
mod services;

pub use error::LotteryApiError;
pub use models::{
    ActivityView, CreateActivityRequest, CreatePrizeRequest, ImportParticipantsRequest,
    LotteryData, ParticipantImport, ResetResponse, SaveWinnerRequest, UpdateActivityRequest,
    UpdatePrizeRequest, WinnerView,
};
pub use router::{lottery_router, LotteryApiState};
pub use services::LotteryService;
