//! JSON shapes the backend speaks (snake_case), and the one mapping into `crate::models`.
//!
//! Nothing outside this module sees a wire type. Responses are taken as-is: unknown enum strings
//! become `None`, rows naming an event outside the fixed set are dropped with a warning.

use crate::models::{
    EventLink, EventName, ExperienceLevel, FoodPreference, GarmentSize, Gender, PartnerOption,
    Player, PlayerDashboard, PlayerEvent, PlayerId, PlayerProfile, Ranking, Registration,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---- requests ----

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PlayerLoginRequest<'a> {
    pub whatsapp: &'a str,
    pub date_of_birth: String,
}

#[derive(Debug, Serialize)]
pub struct EventPayload<'a> {
    pub event_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PlayerPayload<'a> {
    pub name: &'a str,
    pub whatsapp_number: &'a str,
    pub date_of_birth: String,
    pub email: &'a str,
    pub city: &'a str,
    pub address: &'a str,
    pub emergency_contact: &'a str,
    pub playing_experience: &'static str,
    pub medical_conditions: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<&'static str>,
    pub shirt_size: &'static str,
    pub short_size: &'static str,
    pub food_pref: &'static str,
    pub stay_y_or_n: bool,
    pub fee_paid: bool,
}

impl<'a> From<&'a PlayerProfile> for PlayerPayload<'a> {
    fn from(p: &'a PlayerProfile) -> Self {
        Self {
            name: &p.name,
            whatsapp_number: &p.phone,
            date_of_birth: p.date_of_birth.format("%Y-%m-%d").to_string(),
            email: &p.email,
            city: &p.city,
            address: &p.address,
            emergency_contact: &p.emergency_contact,
            playing_experience: p.experience.as_str(),
            medical_conditions: &p.medical_notes,
            gender: p.gender.map(Gender::as_str),
            shirt_size: p.shirt_size.map(GarmentSize::as_str).unwrap_or(""),
            short_size: p.shorts_size.map(GarmentSize::as_str).unwrap_or(""),
            food_pref: p.food_preference.map(FoodPreference::as_str).unwrap_or(""),
            stay_y_or_n: p.needs_accommodation,
            fee_paid: p.fee_paid,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PartnerLinkPayload {
    pub event_name: &'static str,
    pub user_id: PlayerId,
    pub partner_id: Option<PlayerId>,
}

impl From<&EventLink> for PartnerLinkPayload {
    fn from(link: &EventLink) -> Self {
        Self {
            event_name: link.event.as_str(),
            user_id: link.player_id,
            partner_id: link.partner_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelationshipPayload {
    pub event_name: &'static str,
    pub user1_id: PlayerId,
    pub user2_id: PlayerId,
}

#[derive(Debug, Serialize)]
pub struct RankingPayload {
    pub player_id: PlayerId,
    pub event_name: &'static str,
    pub ranking: i64,
}

// ---- responses ----

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<AdminUserWire>,
}

#[derive(Debug, Deserialize)]
pub struct AdminUserWire {
    pub username: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerLoginResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<DashboardWire>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardWire {
    pub player: PlayerWire,
    #[serde(default)]
    pub events: Vec<PlayerEventWire>,
}

/// `/players` create/update acknowledgement.
#[derive(Debug, Deserialize)]
pub struct CreatedWire {
    pub id: Option<PlayerId>,
}

#[derive(Debug, Deserialize)]
pub struct EventWire {
    pub event_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerWire {
    pub id: PlayerId,
    pub name: Option<String>,
    pub whatsapp_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub date_of_birth: Option<String>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub shirt_size: Option<String>,
    pub short_size: Option<String>,
    pub food_pref: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub stay_y_or_n: bool,
    #[serde(deserialize_with = "flag")]
    pub fee_paid: bool,
    pub playing_experience: Option<String>,
    pub medical_conditions: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerEventWire {
    pub event_name: String,
    pub partner_id: Option<PlayerId>,
    pub partner_name: Option<String>,
    pub ranking: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationWire {
    pub player_id: PlayerId,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub event_name: String,
    pub partner_id: Option<PlayerId>,
    pub partner_name: Option<String>,
    pub ranking: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AvailablePartnerWire {
    pub user_id: PlayerId,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub has_partner: bool,
}

/// MySQL booleans arrive as `0/1`, sometimes as `"Y"/"N"`; accept all of them.
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "true" | "1"
        ),
        _ => false,
    })
}

// ---- mapping ----

/// `YYYY-MM-DD`, or the RFC 2822 form Flask uses when serializing dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|d| d.date_naive()))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| n.and_utc())
        })
}

fn ranking_from_wire(raw: Option<i64>, player_id: PlayerId) -> Option<Ranking> {
    let value = raw?;
    match Ranking::new(value) {
        Ok(r) => Some(r),
        Err(_) => {
            log::warn!("ignoring out-of-range ranking {value} for player {player_id}");
            None
        }
    }
}

fn event_from_wire(raw: &str, player_id: PlayerId) -> Option<EventName> {
    match raw.parse() {
        Ok(e) => Some(e),
        Err(_) => {
            log::warn!("dropping row for player {player_id}: unknown event {raw:?}");
            None
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

impl From<PlayerWire> for Player {
    fn from(w: PlayerWire) -> Self {
        Player {
            id: w.id,
            name: w.name.unwrap_or_default(),
            phone: w.whatsapp_number.unwrap_or_default(),
            email: w.email.unwrap_or_default(),
            address: w.address.unwrap_or_default(),
            emergency_contact: w.emergency_contact.unwrap_or_default(),
            date_of_birth: w.date_of_birth.as_deref().and_then(parse_date),
            city: w.city.unwrap_or_default(),
            gender: w.gender.as_deref().and_then(Gender::parse),
            shirt_size: w.shirt_size.as_deref().and_then(GarmentSize::parse),
            shorts_size: w.short_size.as_deref().and_then(GarmentSize::parse),
            food_preference: w.food_pref.as_deref().and_then(FoodPreference::parse),
            needs_accommodation: w.stay_y_or_n,
            fee_paid: w.fee_paid,
            experience: w.playing_experience.as_deref().and_then(ExperienceLevel::parse),
            medical_notes: w.medical_conditions.unwrap_or_default(),
            created_at: w.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

pub fn player_events(owner: PlayerId, rows: Vec<PlayerEventWire>) -> Vec<PlayerEvent> {
    rows.into_iter()
        .filter_map(|w| {
            let event = event_from_wire(&w.event_name, owner)?;
            // The backend fills in a placeholder name when there is no partner.
            let partner_name = w.partner_id.and(non_empty(w.partner_name));
            Some(PlayerEvent {
                event,
                partner_id: w.partner_id,
                partner_name,
                ranking: ranking_from_wire(w.ranking, owner),
            })
        })
        .collect()
}

impl From<DashboardWire> for PlayerDashboard {
    fn from(w: DashboardWire) -> Self {
        let player = Player::from(w.player);
        let events = player_events(player.id, w.events);
        PlayerDashboard { player, events }
    }
}

pub fn registrations(rows: Vec<RegistrationWire>) -> Vec<Registration> {
    rows.into_iter()
        .filter_map(|w| {
            let event = event_from_wire(&w.event_name, w.player_id)?;
            Some(Registration {
                player_id: w.player_id,
                player_name: w.player_name.unwrap_or_default(),
                phone: w.whatsapp_number.unwrap_or_default(),
                email: w.email.unwrap_or_default(),
                city: w.city.unwrap_or_default(),
                event,
                partner_id: w.partner_id,
                partner_name: w.partner_id.and(non_empty(w.partner_name)),
                ranking: ranking_from_wire(w.ranking, w.player_id),
            })
        })
        .collect()
}

pub fn events(rows: Vec<EventWire>) -> Vec<EventName> {
    rows.into_iter()
        .filter_map(|w| match w.event_name.parse() {
            Ok(e) => Some(e),
            Err(_) => {
                log::warn!("ignoring unknown event {:?}", w.event_name);
                None
            }
        })
        .collect()
}

pub fn partner_options(rows: Vec<AvailablePartnerWire>) -> Vec<PartnerOption> {
    rows.into_iter()
        .map(|w| PartnerOption {
            player_id: w.user_id,
            name: w.player_name.unwrap_or_default(),
            has_partner: w.has_partner,
        })
        .collect()
}
