//! Data structures for tournament registration: players, events, registrations, teams.

mod event;
mod player;
mod registration;

pub use event::{events_for_gender, EventKind, EventName, Gender, UnknownEvent};
pub use player::{ExperienceLevel, FoodPreference, GarmentSize, Player, PlayerId, PlayerProfile};
pub use registration::{
    EventLink, PartnerOption, PlayerDashboard, PlayerEvent, Ranking, RankingInputError, Registration,
    Team, TeamKey,
};
