//! Player-event links, rankings, and the derived doubles team.

use crate::models::event::EventName;
use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seed ranking within an event. Always in `MIN..=MAX`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Ranking(u16);

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RankingInputError {
    #[error("Ranking must be a whole number")]
    NotANumber,
    #[error("Ranking must be between {min} and {max}", min = Ranking::MIN, max = Ranking::MAX)]
    OutOfRange,
}

impl Ranking {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 1000;

    pub fn new(value: i64) -> Result<Self, RankingInputError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(RankingInputError::OutOfRange);
        }
        Ok(Self(value as u16))
    }

    /// Parse admin input. Empty (after trimming) means "no change" and yields `Ok(None)`.
    pub fn parse_input(raw: &str) -> Result<Option<Self>, RankingInputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: i64 = trimmed.parse().map_err(|_| RankingInputError::NotANumber)?;
        Self::new(value).map(Some)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Ranking {
    type Error = RankingInputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ranking> for i64 {
    fn from(r: Ranking) -> Self {
        i64::from(r.0)
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the admin registrations table: a player entered in one event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub player_id: PlayerId,
    pub player_name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub event: EventName,
    pub partner_id: Option<PlayerId>,
    pub partner_name: Option<String>,
    pub ranking: Option<Ranking>,
}

/// An event as shown on a player's own dashboard.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvent {
    pub event: EventName,
    pub partner_id: Option<PlayerId>,
    pub partner_name: Option<String>,
    pub ranking: Option<Ranking>,
}

/// Candidate partner for a doubles event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PartnerOption {
    pub player_id: PlayerId,
    pub name: String,
    /// Already paired for this event; shown but not selectable.
    pub has_partner: bool,
}

impl PartnerOption {
    pub fn selectable(&self) -> bool {
        !self.has_partner
    }
}

/// Link to create on the backend: `player` enters `event`, optionally with `partner`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventLink {
    pub player_id: PlayerId,
    pub event: EventName,
    pub partner_id: Option<PlayerId>,
}

/// Unordered pair of player ids identifying a doubles team. A player without a partner
/// forms a team of one.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TeamKey {
    first: PlayerId,
    second: Option<PlayerId>,
}

impl TeamKey {
    pub fn new(player: PlayerId, partner: Option<PlayerId>) -> Self {
        match partner {
            Some(p) if p < player => Self { first: p, second: Some(player) },
            Some(p) if p == player => Self { first: player, second: None },
            _ => Self { first: player, second: partner },
        }
    }

    /// Member ids in ascending order.
    pub fn members(&self) -> Vec<PlayerId> {
        std::iter::once(self.first).chain(self.second).collect()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.first == player || self.second == Some(player)
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.second {
            Some(second) => write!(f, "{}-{}", self.first, second),
            None => write!(f, "{}", self.first),
        }
    }
}

/// Doubles team derived from one or two mirrored registration rows.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub key: TeamKey,
    pub event: EventName,
    /// (id, name) per member, in key order.
    pub members: Vec<(PlayerId, String)>,
    /// First ranking found on any member's row.
    pub ranking: Option<Ranking>,
}

/// A player's own view: profile plus every event they are entered in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerDashboard {
    pub player: Player,
    pub events: Vec<PlayerEvent>,
}
