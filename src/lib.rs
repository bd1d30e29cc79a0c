//! Tennis tournament registration: backend API client, registration workflows and the
//! models they share. `server` holds the actix-web routes the `web` binary serves.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;
pub mod server;

pub use api::{ApiClient, ApiError, Session, TournamentApi};
pub use config::AppConfig;
pub use logic::{RankingBoard, RegistrationWizard};
pub use models::{
    EventLink, EventName, Gender, Player, PlayerDashboard, PlayerId, PlayerProfile, Ranking,
    Registration, Team, TeamKey,
};
