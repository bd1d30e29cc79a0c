//! Shared fixtures: an in-memory `TournamentApi` that records every call.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use tournament_registration_web::api::{AdminIdentity, ApiError, TournamentApi};
use tournament_registration_web::logic::ProfileForm;
use tournament_registration_web::models::{
    EventLink, EventName, Gender, PartnerOption, Player, PlayerDashboard, PlayerEvent, PlayerId,
    PlayerProfile, Ranking, Registration,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Login(String),
    PlayerLogin(String, NaiveDate),
    Probe,
    ListEvents,
    CreatePlayer(String),
    UpdatePlayer(PlayerId),
    PlayerDashboard(PlayerId),
    AvailablePartners(EventName, PlayerId, Option<Gender>),
    CreateLink(EventLink),
    Relationship(EventName, PlayerId, PlayerId),
    DeleteLinks(PlayerId),
    UpdateRanking(PlayerId, EventName, u16),
    AllRegistrations,
}

type Matcher = Box<dyn Fn(&Call) -> bool>;
type Failure = Box<dyn Fn() -> ApiError>;

pub struct FakeApi {
    pub calls: RefCell<Vec<Call>>,
    pub registrations: RefCell<Vec<Registration>>,
    pub events: Vec<EventName>,
    pub partners: Vec<PartnerOption>,
    pub dashboard: Option<PlayerDashboard>,
    pub next_player_id: PlayerId,
    token: RefCell<Option<String>>,
    failures: RefCell<Vec<(Matcher, Failure)>>,
    logouts: Cell<usize>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            registrations: RefCell::new(Vec::new()),
            events: EventName::ALL.to_vec(),
            partners: Vec::new(),
            dashboard: None,
            next_player_id: 500,
            token: RefCell::new(None),
            failures: RefCell::new(Vec::new()),
            logouts: Cell::new(0),
        }
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registrations(rows: Vec<Registration>) -> Self {
        let api = Self::new();
        *api.registrations.borrow_mut() = rows;
        api
    }

    pub fn with_token(self, token: &str) -> Self {
        *self.token.borrow_mut() = Some(token.to_string());
        self
    }

    /// Make every call matching `when` fail with `error()`.
    pub fn fail_on(
        &self,
        when: impl Fn(&Call) -> bool + 'static,
        error: impl Fn() -> ApiError + 'static,
    ) {
        self.failures
            .borrow_mut()
            .push((Box::new(when), Box::new(error)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn ranking_calls(&self) -> Vec<(PlayerId, EventName, u16)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateRanking(p, e, r) => Some((p, e, r)),
                _ => None,
            })
            .collect()
    }

    pub fn logouts(&self) -> usize {
        self.logouts.get()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        let failure = self
            .failures
            .borrow()
            .iter()
            .find(|(when, _)| when(&call))
            .map(|(_, error)| error());
        self.calls.borrow_mut().push(call);
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl TournamentApi for FakeApi {
    async fn login(&self, username: &str, _password: &str) -> Result<AdminIdentity, ApiError> {
        self.record(Call::Login(username.to_string()))?;
        *self.token.borrow_mut() = Some("fake-token".to_string());
        Ok(AdminIdentity {
            username: username.to_string(),
            role: Some("admin".to_string()),
        })
    }

    async fn player_login(
        &self,
        phone: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<PlayerDashboard>, ApiError> {
        self.record(Call::PlayerLogin(phone.to_string(), date_of_birth))?;
        Ok(self.dashboard.clone())
    }

    async fn probe(&self) -> Result<(), ApiError> {
        self.record(Call::Probe)?;
        if self.token.borrow().is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<EventName>, ApiError> {
        self.record(Call::ListEvents)?;
        Ok(self.events.clone())
    }

    async fn create_player(&self, profile: &PlayerProfile) -> Result<PlayerId, ApiError> {
        self.record(Call::CreatePlayer(profile.name.clone()))?;
        Ok(self.next_player_id)
    }

    async fn update_player(
        &self,
        id: PlayerId,
        _profile: &PlayerProfile,
    ) -> Result<PlayerId, ApiError> {
        self.record(Call::UpdatePlayer(id))?;
        Ok(id)
    }

    async fn player_dashboard(&self, id: PlayerId) -> Result<PlayerDashboard, ApiError> {
        self.record(Call::PlayerDashboard(id))?;
        self.dashboard
            .clone()
            .filter(|d| d.player.id == id)
            .ok_or_else(|| ApiError::NotFound("Player not found".to_string()))
    }

    async fn available_partners(
        &self,
        event: EventName,
        player: PlayerId,
        gender: Option<Gender>,
    ) -> Result<Vec<PartnerOption>, ApiError> {
        self.record(Call::AvailablePartners(event, player, gender))?;
        Ok(self.partners.clone())
    }

    async fn create_partner_link(&self, link: &EventLink) -> Result<(), ApiError> {
        self.record(Call::CreateLink(*link))
    }

    async fn update_partner_relationship(
        &self,
        event: EventName,
        player: PlayerId,
        partner: PlayerId,
    ) -> Result<(), ApiError> {
        self.record(Call::Relationship(event, player, partner))
    }

    async fn delete_player_links(&self, player: PlayerId) -> Result<(), ApiError> {
        self.record(Call::DeleteLinks(player))
    }

    async fn update_ranking(
        &self,
        player: PlayerId,
        event: EventName,
        ranking: Ranking,
    ) -> Result<(), ApiError> {
        self.record(Call::UpdateRanking(player, event, ranking.get()))?;
        for row in self.registrations.borrow_mut().iter_mut() {
            if row.player_id == player && row.event == event {
                row.ranking = Some(ranking);
            }
        }
        Ok(())
    }

    async fn all_registrations(&self) -> Result<Vec<Registration>, ApiError> {
        self.record(Call::AllRegistrations)?;
        Ok(self.registrations.borrow().clone())
    }

    fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    fn logout(&self) {
        self.logouts.set(self.logouts.get() + 1);
        self.token.borrow_mut().take();
    }
}

pub fn registration(
    player_id: PlayerId,
    name: &str,
    event: EventName,
    partner: Option<(PlayerId, &str)>,
    ranking: Option<i64>,
) -> Registration {
    Registration {
        player_id,
        player_name: name.to_string(),
        phone: format!("98765{player_id:05}"),
        email: format!("{}@example.com", name.to_lowercase()),
        city: "Pune".to_string(),
        event,
        partner_id: partner.map(|(id, _)| id),
        partner_name: partner.map(|(_, n)| n.to_string()),
        ranking: ranking.map(|r| Ranking::new(r).unwrap()),
    }
}

/// A profile form that passes every check.
pub fn valid_form() -> ProfileForm {
    ProfileForm {
        name: "Asha Rao".to_string(),
        phone: "98765 43210".to_string(),
        date_of_birth: "1994-06-15".to_string(),
        email: "asha@example.com".to_string(),
        city: "Pune".to_string(),
        address: "12 MG Road".to_string(),
        emergency_contact: "9123456780".to_string(),
        experience: "intermediate".to_string(),
        gender: "female".to_string(),
        shirt_size: "M".to_string(),
        shorts_size: "S".to_string(),
        food_preference: "vegetarian".to_string(),
        ..ProfileForm::default()
    }
}

pub fn dashboard(id: PlayerId, gender: Option<Gender>, events: Vec<PlayerEvent>) -> PlayerDashboard {
    PlayerDashboard {
        player: Player {
            id,
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            city: "Pune".to_string(),
            gender,
            date_of_birth: NaiveDate::from_ymd_opt(1994, 6, 15),
            ..Player::default()
        },
        events,
    }
}
