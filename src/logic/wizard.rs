//! Two-step registration: profile first, then up to two events with optional partners.
//!
//! The same flow serves new registrations and edits. In edit mode step 2 withdraws every
//! existing link before recreating the chosen ones.

use crate::api::{ApiError, TournamentApi};
use crate::logic::validation::{validate_profile, ProfileErrors, ProfileForm};
use crate::models::{
    events_for_gender, EventLink, EventName, Gender, PartnerOption, PlayerDashboard, PlayerId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardMode {
    New,
    Edit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Profile,
    Events,
    Completed,
}

/// Label shown next to a partner the player already has but who the backend no longer lists.
pub const CURRENT_PARTNER_LABEL: &str = "(Current Partner)";

/// Partner picked for a doubles slot. On the form this is `""`, `"not-registered"` or an id.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PartnerChoice {
    #[default]
    Unselected,
    /// Partner has not registered yet; the link is created without one.
    NotRegistered,
    Player(PlayerId),
}

impl PartnerChoice {
    pub fn partner_id(self) -> Option<PlayerId> {
        match self {
            PartnerChoice::Player(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid partner choice {0:?}")]
pub struct InvalidPartnerChoice(String);

impl TryFrom<String> for PartnerChoice {
    type Error = InvalidPartnerChoice;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.trim() {
            "" => Ok(PartnerChoice::Unselected),
            "not-registered" => Ok(PartnerChoice::NotRegistered),
            other => other
                .parse()
                .map(PartnerChoice::Player)
                .map_err(|_| InvalidPartnerChoice(raw)),
        }
    }
}

impl From<PartnerChoice> for String {
    fn from(choice: PartnerChoice) -> Self {
        choice.to_string()
    }
}

impl fmt::Display for PartnerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartnerChoice::Unselected => Ok(()),
            PartnerChoice::NotRegistered => f.write_str("not-registered"),
            PartnerChoice::Player(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SelectionError {
    #[error("Event 1 and Event 2 must be different")]
    DuplicateEvent,
    #[error("Please select a partner for Event {0}")]
    PartnerRequired(u8),
    #[error("You cannot select yourself as a partner for Event {0}")]
    SelfPartner(u8),
    #[error("{0} is not open to this player")]
    EventNotOpen(EventName),
}

/// Step-2 form state. Both slots are optional.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSelection {
    pub event1: Option<EventName>,
    pub partner1: PartnerChoice,
    pub event2: Option<EventName>,
    pub partner2: PartnerChoice,
}

impl EventSelection {
    /// Prefill from the player's existing events, in the order the backend returned them.
    pub fn from_events(events: &[crate::models::PlayerEvent]) -> Self {
        let slot = |i: usize| {
            events.get(i).map(|e| {
                let partner = match (e.event.is_doubles(), e.partner_id) {
                    (false, _) => PartnerChoice::Unselected,
                    (true, Some(id)) => PartnerChoice::Player(id),
                    (true, None) => PartnerChoice::NotRegistered,
                };
                (e.event, partner)
            })
        };
        let (event1, partner1) = slot(0).map_or((None, PartnerChoice::Unselected), |(e, p)| (Some(e), p));
        let (event2, partner2) = slot(1).map_or((None, PartnerChoice::Unselected), |(e, p)| (Some(e), p));
        Self { event1, partner1, event2, partner2 }
    }

    /// Singles slots never carry a partner; empty slots never carry one either.
    pub fn normalized(self) -> Self {
        let fix = |event: Option<EventName>, partner: PartnerChoice| match event {
            Some(e) if e.is_doubles() => partner,
            _ => PartnerChoice::Unselected,
        };
        Self {
            partner1: fix(self.event1, self.partner1),
            partner2: fix(self.event2, self.partner2),
            ..self
        }
    }

    /// Turn the selection into the links to create for `player`, checking it first.
    pub fn plan(self, player: PlayerId, gender: Option<Gender>) -> Result<Vec<EventLink>, SelectionError> {
        let sel = self.normalized();
        if let (Some(a), Some(b)) = (sel.event1, sel.event2) {
            if a == b {
                return Err(SelectionError::DuplicateEvent);
            }
        }

        let mut links = Vec::with_capacity(2);
        for (slot, event, partner) in [(1u8, sel.event1, sel.partner1), (2, sel.event2, sel.partner2)] {
            let Some(event) = event else { continue };
            if !event.open_to(gender) {
                return Err(SelectionError::EventNotOpen(event));
            }
            let partner_id = if event.is_singles() {
                None
            } else {
                match partner {
                    PartnerChoice::Unselected => return Err(SelectionError::PartnerRequired(slot)),
                    PartnerChoice::NotRegistered => None,
                    PartnerChoice::Player(id) if id == player => {
                        return Err(SelectionError::SelfPartner(slot))
                    }
                    PartnerChoice::Player(id) => Some(id),
                }
            };
            links.push(EventLink { player_id: player, event, partner_id });
        }
        Ok(links)
    }

    /// Partner the slot holding `event` points at, if any.
    pub fn partner_for(&self, event: EventName) -> Option<PlayerId> {
        if self.event1 == Some(event) {
            self.partner1.partner_id()
        } else if self.event2 == Some(event) {
            self.partner2.partner_id()
        } else {
            None
        }
    }
}

/// Duplicate-registration outcomes the backend reports on profile submit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistrationConflict {
    PhoneAndBirthDate,
    Phone,
}

impl RegistrationConflict {
    /// Recognise the backend's duplicate messages. Anything else is passed through as-is.
    pub fn classify(message: &str) -> Option<Self> {
        if message.contains("already registered with this WhatsApp number and date of birth") {
            Some(RegistrationConflict::PhoneAndBirthDate)
        } else if message.contains("already registered with this WhatsApp number") {
            Some(RegistrationConflict::Phone)
        } else {
            None
        }
    }

    pub fn friendly_message(self) -> &'static str {
        match self {
            RegistrationConflict::PhoneAndBirthDate => {
                "A player with this WhatsApp number and date of birth is already registered. \
                 Please check your information or contact support if you believe this is an error."
            }
            RegistrationConflict::Phone => {
                "This WhatsApp number is already registered with a different date of birth. \
                 Please verify your information or use a different WhatsApp number."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Please correct the highlighted fields")]
    Invalid(#[from] ProfileErrors),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("{}", .0.friendly_message())]
    Conflict(RegistrationConflict),
    #[error("Player ID not found. Please start registration again.")]
    MissingPlayerId,
    #[error("This action is not available on the {0:?} step")]
    WrongStep(WizardStep),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WizardError {
    fn from_profile_submit(e: ApiError) -> Self {
        match e.backend_message().and_then(RegistrationConflict::classify) {
            Some(conflict) => WizardError::Conflict(conflict),
            None => WizardError::Api(e),
        }
    }
}

/// Candidate partners for `event`, never failing: errors degrade to an empty list.
///
/// When `current_partner` is set but missing from the backend's answer it is appended as a
/// selectable placeholder, so an edit does not silently drop the existing pairing.
pub async fn available_partners<A: TournamentApi>(
    api: &A,
    event: EventName,
    player: PlayerId,
    current_partner: Option<PlayerId>,
) -> Vec<PartnerOption> {
    let mut options = match api
        .available_partners(event, player, event.partner_gender())
        .await
    {
        Ok(options) => options,
        Err(e) => {
            log::warn!("partner lookup for {event} (player {player}) failed: {e}");
            Vec::new()
        }
    };
    options.retain(|o| o.player_id != player);
    if let Some(current) = current_partner.filter(|&c| c != player) {
        if !options.iter().any(|o| o.player_id == current) {
            options.push(PartnerOption {
                player_id: current,
                name: CURRENT_PARTNER_LABEL.to_string(),
                has_partner: false,
            });
        }
    }
    options
}

#[derive(Clone, Debug)]
pub struct RegistrationWizard {
    mode: WizardMode,
    step: WizardStep,
    player_id: Option<PlayerId>,
    gender: Option<Gender>,
    form: ProfileForm,
    selection: EventSelection,
    /// Selection loaded in edit mode; its partners stay offered as placeholders.
    initial: EventSelection,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self {
            mode: WizardMode::New,
            step: WizardStep::Profile,
            player_id: None,
            gender: None,
            form: ProfileForm::default(),
            selection: EventSelection::default(),
            initial: EventSelection::default(),
        }
    }

    /// Start an edit, prefilled from the player's dashboard.
    pub fn edit(dashboard: &PlayerDashboard) -> Self {
        let selection = EventSelection::from_events(&dashboard.events);
        Self {
            mode: WizardMode::Edit,
            step: WizardStep::Profile,
            player_id: Some(dashboard.player.id),
            gender: dashboard.player.gender,
            form: ProfileForm::from_player(&dashboard.player),
            selection,
            initial: selection,
        }
    }

    /// Step 1 again for a player whose profile may already exist; resubmitting updates it.
    pub fn reopen(mode: WizardMode, player_id: Option<PlayerId>) -> Self {
        Self {
            mode,
            player_id,
            ..Self::new()
        }
    }

    /// Pick the flow up at step 2 for a player whose profile was already submitted.
    pub fn resume(mode: WizardMode, player_id: PlayerId, gender: Option<Gender>) -> Self {
        Self {
            mode,
            step: WizardStep::Events,
            player_id: Some(player_id),
            gender,
            ..Self::new()
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn selection(&self) -> EventSelection {
        self.selection
    }

    /// Return to step 1 keeping every entered value.
    pub fn back(&mut self) {
        if self.step == WizardStep::Events {
            self.step = WizardStep::Profile;
        }
    }

    /// Validate and save the profile (create, or update once an id exists), then advance.
    pub async fn submit_profile<A: TournamentApi>(
        &mut self,
        api: &A,
        form: ProfileForm,
    ) -> Result<PlayerId, WizardError> {
        if self.step != WizardStep::Profile {
            return Err(WizardError::WrongStep(self.step));
        }
        let profile = validate_profile(&form)?;
        let saved = match self.player_id {
            Some(id) => api.update_player(id, &profile).await,
            None => api.create_player(&profile).await,
        };
        let id = saved.map_err(WizardError::from_profile_submit)?;

        log::info!("profile saved for player {id} ({:?})", self.mode);
        self.player_id = Some(id);
        self.gender = profile.gender;
        self.form = form;
        self.step = WizardStep::Events;
        Ok(id)
    }

    /// Events the player may pick, narrowed by gender.
    pub async fn load_events<A: TournamentApi>(&self, api: &A) -> Result<Vec<EventName>, ApiError> {
        let events = api.list_events().await?;
        Ok(events_for_gender(&events, self.gender))
    }

    pub async fn partner_options<A: TournamentApi>(
        &self,
        api: &A,
        event: EventName,
    ) -> Result<Vec<PartnerOption>, WizardError> {
        let player = self.player_id.ok_or(WizardError::MissingPlayerId)?;
        Ok(available_partners(api, event, player, self.initial.partner_for(event)).await)
    }

    /// Save step 2. Links are created one at a time; the first failure aborts with
    /// whatever was already written left in place.
    pub async fn submit_events<A: TournamentApi>(
        &mut self,
        api: &A,
        selection: EventSelection,
    ) -> Result<Vec<EventLink>, WizardError> {
        if self.step != WizardStep::Events {
            return Err(WizardError::WrongStep(self.step));
        }
        let player = self.player_id.ok_or(WizardError::MissingPlayerId)?;
        let links = selection.plan(player, self.gender)?;

        if self.mode == WizardMode::Edit {
            log::info!("withdrawing existing event links for player {player}");
            api.delete_player_links(player).await?;
        }
        for link in &links {
            api.create_partner_link(link).await?;
            if let Some(partner) = link.partner_id {
                api.update_partner_relationship(link.event, player, partner).await?;
            }
        }

        log::info!("player {player} registered for {} event(s)", links.len());
        self.selection = selection.normalized();
        self.step = WizardStep::Completed;
        Ok(links)
    }
}
