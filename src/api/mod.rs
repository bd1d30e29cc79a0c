//! Client for the registration REST backend.

mod client;
mod error;
mod session;
pub mod wire;

pub use client::{http_client, AdminIdentity, ApiClient, StatisticsRow, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use session::{MemoryTokenStore, Session, TokenStore, AUTH_TOKEN_KEY};

use crate::models::{
    EventLink, EventName, Gender, PartnerOption, PlayerDashboard, PlayerId, PlayerProfile, Ranking,
    Registration,
};
use chrono::NaiveDate;

/// Backend operations the workflows depend on. `ApiClient` is the real implementation.
///
/// Handlers run on a single-threaded executor, so the futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait TournamentApi {
    /// Admin credential login. Stores the returned token in the session.
    async fn login(&self, username: &str, password: &str) -> Result<AdminIdentity, ApiError>;

    /// Player identity login. `Ok(None)` when the backend answers without `success`.
    async fn player_login(
        &self,
        phone: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<PlayerDashboard>, ApiError>;

    /// Cheap authenticated request used to check a stored token.
    async fn probe(&self) -> Result<(), ApiError>;

    async fn list_events(&self) -> Result<Vec<EventName>, ApiError>;

    async fn create_player(&self, profile: &PlayerProfile) -> Result<PlayerId, ApiError>;

    /// Returns the id the backend echoed, or `id` when it echoed none.
    async fn update_player(&self, id: PlayerId, profile: &PlayerProfile)
        -> Result<PlayerId, ApiError>;

    async fn player_dashboard(&self, id: PlayerId) -> Result<PlayerDashboard, ApiError>;

    async fn available_partners(
        &self,
        event: EventName,
        player: PlayerId,
        gender: Option<Gender>,
    ) -> Result<Vec<PartnerOption>, ApiError>;

    async fn create_partner_link(&self, link: &EventLink) -> Result<(), ApiError>;

    async fn update_partner_relationship(
        &self,
        event: EventName,
        player: PlayerId,
        partner: PlayerId,
    ) -> Result<(), ApiError>;

    /// Remove every event link the player holds.
    async fn delete_player_links(&self, player: PlayerId) -> Result<(), ApiError>;

    async fn update_ranking(
        &self,
        player: PlayerId,
        event: EventName,
        ranking: Ranking,
    ) -> Result<(), ApiError>;

    async fn all_registrations(&self) -> Result<Vec<Registration>, ApiError>;

    fn is_authenticated(&self) -> bool;

    fn logout(&self);
}
