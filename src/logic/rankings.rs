//! Admin ranking edits: pending input kept apart from the loaded registrations, then saved
//! one call at a time.

use crate::api::TournamentApi;
use crate::models::{EventName, PlayerId, Ranking, RankingInputError, Registration, Team, TeamKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which registrations the admin is looking at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFilter {
    #[default]
    All,
    Only(EventName),
}

impl EventFilter {
    pub fn matches(self, event: EventName) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(e) => e == event,
        }
    }

    pub fn event(self) -> Option<EventName> {
        match self {
            EventFilter::All => None,
            EventFilter::Only(e) => Some(e),
        }
    }
}

impl From<Option<EventName>> for EventFilter {
    fn from(event: Option<EventName>) -> Self {
        event.map_or(EventFilter::All, EventFilter::Only)
    }
}

/// Identifies one ranking input: a single row, or a whole doubles team.
///
/// Written as `101-Men's Singles` for a row and `101-102` (or `101`) for a team.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RankingKey {
    Player { player_id: PlayerId, event: EventName },
    Team(TeamKey),
}

impl RankingKey {
    pub fn player(player_id: PlayerId, event: EventName) -> Self {
        RankingKey::Player { player_id, event }
    }

    pub fn team(player: PlayerId, partner: Option<PlayerId>) -> Self {
        RankingKey::Team(TeamKey::new(player, partner))
    }
}

impl fmt::Display for RankingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingKey::Player { player_id, event } => write!(f, "{player_id}-{event}"),
            RankingKey::Team(team) => write!(f, "{team}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unrecognised ranking key {0:?}")]
pub struct InvalidRankingKey(String);

impl FromStr for RankingKey {
    type Err = InvalidRankingKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRankingKey(s.to_string());
        let Some((head, tail)) = s.split_once('-') else {
            let id = s.trim().parse().map_err(|_| invalid())?;
            return Ok(RankingKey::team(id, None));
        };
        let player_id: PlayerId = head.trim().parse().map_err(|_| invalid())?;
        if let Ok(partner) = tail.trim().parse::<PlayerId>() {
            return Ok(RankingKey::team(player_id, Some(partner)));
        }
        let event = tail.parse().map_err(|_| invalid())?;
        Ok(RankingKey::player(player_id, event))
    }
}

impl Serialize for RankingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RankingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One backend write: a single player's ranking in one event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct RankingUpdate {
    pub player_id: PlayerId,
    pub event: EventName,
    pub ranking: Ranking,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Saved,
    Failed { message: String },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub update: RankingUpdate,
    pub outcome: Outcome,
}

/// Aggregate result of a save. Built after every call has run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SaveReport {
    pub outcomes: Vec<UpdateOutcome>,
    /// Set when the post-save reload failed; the table may be stale.
    pub reload_error: Option<String>,
}

impl SaveReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn saved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Saved)
            .count()
    }

    /// Ids whose update failed, ascending and without repeats.
    pub fn failed_players(&self) -> Vec<PlayerId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed { .. }))
            .map(|o| o.update.player_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome == Outcome::Saved)
    }

    pub fn summary(&self) -> String {
        let mut text = if self.outcomes.is_empty() {
            "No ranking changes to save".to_string()
        } else if self.is_complete_success() {
            format!("Rankings saved ({} update(s))", self.attempted())
        } else {
            let ids: Vec<String> = self.failed_players().iter().map(|id| id.to_string()).collect();
            format!(
                "Saved {} of {} ranking update(s); failed for player(s) {}",
                self.saved(),
                self.attempted(),
                ids.join(", ")
            )
        };
        if let Some(e) = &self.reload_error {
            text.push_str(&format!(". Could not reload registrations: {e}"));
        }
        text
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("You have unsaved ranking changes. Leave anyway?")]
pub struct UnsavedChanges;

/// Let the admin leave only when nothing is pending or they confirmed.
pub fn guard_leave(has_unsaved: bool, confirmed: bool) -> Result<(), UnsavedChanges> {
    if has_unsaved && !confirmed {
        Err(UnsavedChanges)
    } else {
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RankingBoard {
    registrations: Vec<Registration>,
    filter: EventFilter,
    pending: BTreeMap<RankingKey, String>,
}

impl RankingBoard {
    pub fn new(registrations: Vec<Registration>) -> Self {
        Self {
            registrations,
            ..Self::default()
        }
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn filter(&self) -> EventFilter {
        self.filter
    }

    /// Switch the visible event. Pending edits belong to the old view and are dropped.
    pub fn select(&mut self, filter: EventFilter) {
        if filter != self.filter && !self.pending.is_empty() {
            log::debug!("dropping {} pending ranking edit(s) on filter change", self.pending.len());
            self.pending.clear();
        }
        self.filter = filter;
    }

    /// Doubles event in focus, when rows are grouped into teams.
    pub fn team_event(&self) -> Option<EventName> {
        self.filter.event().filter(|e| e.is_doubles())
    }

    pub fn visible_rows(&self) -> Vec<&Registration> {
        self.registrations
            .iter()
            .filter(|r| self.filter.matches(r.event))
            .collect()
    }

    /// Visible rows folded into teams, in first-seen order. Mirrored rows collapse into one.
    pub fn teams(&self) -> Vec<Team> {
        let Some(event) = self.team_event() else {
            return Vec::new();
        };
        let mut teams: Vec<Team> = Vec::new();
        let mut index: HashMap<TeamKey, usize> = HashMap::new();
        for row in self.visible_rows() {
            let key = TeamKey::new(row.player_id, row.partner_id);
            if let Some(&i) = index.get(&key) {
                let team = &mut teams[i];
                if team.ranking.is_none() {
                    team.ranking = row.ranking;
                }
                if let Some(member) = team.members.iter_mut().find(|(id, _)| *id == row.player_id) {
                    member.1 = row.player_name.clone();
                }
                continue;
            }
            let members = key
                .members()
                .into_iter()
                .map(|id| {
                    let name = if id == row.player_id {
                        row.player_name.clone()
                    } else {
                        row.partner_name.clone().unwrap_or_default()
                    };
                    (id, name)
                })
                .collect();
            index.insert(key, teams.len());
            teams.push(Team {
                key,
                event,
                members,
                ranking: row.ranking,
            });
        }
        teams
    }

    pub fn key_for(&self, row: &Registration) -> RankingKey {
        match self.team_event() {
            Some(_) => RankingKey::team(row.player_id, row.partner_id),
            None => RankingKey::player(row.player_id, row.event),
        }
    }

    /// Keys an edit may target in the current view.
    pub fn visible_keys(&self) -> BTreeSet<RankingKey> {
        self.visible_rows().into_iter().map(|r| self.key_for(r)).collect()
    }

    pub fn pending(&self) -> &BTreeMap<RankingKey, String> {
        &self.pending
    }

    /// True when some pending edit would actually be written.
    pub fn has_unsaved_changes(&self) -> bool {
        self.pending.values().any(|v| !v.trim().is_empty())
    }

    pub fn guard_leave(&self, confirmed: bool) -> Result<(), UnsavedChanges> {
        guard_leave(self.has_unsaved_changes(), confirmed)
    }

    /// What the input for `key` shows: the pending edit, else the loaded ranking.
    pub fn display_value(&self, key: RankingKey) -> String {
        if let Some(v) = self.pending.get(&key) {
            return v.clone();
        }
        self.visible_rows()
            .into_iter()
            .filter(|r| self.key_for(r) == key)
            .find_map(|r| r.ranking)
            .map(|r| r.to_string())
            .unwrap_or_default()
    }

    /// Record an edit. Invalid input is rejected and leaves the pending state untouched.
    pub fn set_ranking(&mut self, key: RankingKey, input: &str) -> Result<(), RankingInputError> {
        Ranking::parse_input(input)?;
        self.pending.insert(key, input.trim().to_string());
        Ok(())
    }

    /// Apply one value to every visible row of `player`. Returns how many inputs changed.
    pub fn copy_to_all_events(
        &mut self,
        player: PlayerId,
        input: &str,
    ) -> Result<usize, RankingInputError> {
        Ranking::parse_input(input)?;
        let keys: BTreeSet<RankingKey> = self
            .visible_rows()
            .into_iter()
            .filter(|r| r.player_id == player)
            .map(|r| self.key_for(r))
            .collect();
        let value = input.trim();
        for key in &keys {
            self.pending.insert(*key, value.to_string());
        }
        Ok(keys.len())
    }

    /// Writes a save would make now: visible, non-empty edits only, one per player.
    pub fn planned_updates(&self) -> Vec<RankingUpdate> {
        let visible = self.visible_keys();
        let mut updates = Vec::new();
        for (key, raw) in &self.pending {
            if !visible.contains(key) {
                log::debug!("skipping ranking edit for {key}: not in the current view");
                continue;
            }
            let Ok(Some(ranking)) = Ranking::parse_input(raw) else {
                continue;
            };
            match *key {
                RankingKey::Player { player_id, event } => updates.push(RankingUpdate {
                    player_id,
                    event,
                    ranking,
                }),
                RankingKey::Team(team) => {
                    let Some(event) = self.team_event() else { continue };
                    updates.extend(team.members().into_iter().map(|player_id| RankingUpdate {
                        player_id,
                        event,
                        ranking,
                    }));
                }
            }
        }
        updates
    }

    /// Submit every planned update in order, never stopping early, then reload.
    /// Pending edits are cleared whatever the outcome.
    pub async fn save<A: TournamentApi>(&mut self, api: &A) -> SaveReport {
        let updates = self.planned_updates();
        let mut outcomes = Vec::with_capacity(updates.len());
        for update in updates {
            let outcome = match api
                .update_ranking(update.player_id, update.event, update.ranking)
                .await
            {
                Ok(()) => Outcome::Saved,
                Err(e) => {
                    log::error!(
                        "ranking update for player {} in {} failed: {e}",
                        update.player_id,
                        update.event
                    );
                    Outcome::Failed { message: e.to_string() }
                }
            };
            outcomes.push(UpdateOutcome { update, outcome });
        }

        let reload_error = match api.all_registrations().await {
            Ok(registrations) => {
                self.registrations = registrations;
                None
            }
            Err(e) => {
                log::error!("reloading registrations after save failed: {e}");
                Some(e.to_string())
            }
        };
        self.pending.clear();

        let report = SaveReport { outcomes, reload_error };
        log::info!("{}", report.summary());
        report
    }
}
