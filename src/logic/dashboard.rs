//! View models for the player and admin dashboards, plus CSV export.

use crate::logic::rankings::EventFilter;
use crate::models::{PlayerDashboard, PlayerId, Registration};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

pub const NOT_PROVIDED: &str = "Not provided";
pub const NO_PARTNER: &str = "No partner assigned";
pub const NOT_AVAILABLE: &str = "Not available";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV export produced invalid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// `15 Jun 2025`, or "Not provided".
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}

fn or_not_provided(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DetailLine {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EventCard {
    pub event: String,
    pub partner: String,
    pub ranking: Option<u16>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlayerDashboardView {
    pub player_id: PlayerId,
    pub name: String,
    pub details: Vec<DetailLine>,
    pub events: Vec<EventCard>,
    pub registered_on: String,
}

impl From<&PlayerDashboard> for PlayerDashboardView {
    fn from(d: &PlayerDashboard) -> Self {
        let p = &d.player;
        let opt = |v: Option<&'static str>| v.map_or_else(|| NOT_PROVIDED.to_string(), str::to_string);
        let yes_no = |b: bool| (if b { "Yes" } else { "No" }).to_string();
        let details = vec![
            DetailLine { label: "WhatsApp", value: or_not_provided(&p.phone) },
            DetailLine { label: "Email", value: or_not_provided(&p.email) },
            DetailLine { label: "Date of birth", value: format_date(p.date_of_birth) },
            DetailLine { label: "Gender", value: opt(p.gender.map(|g| g.as_str())) },
            DetailLine { label: "City", value: or_not_provided(&p.city) },
            DetailLine { label: "Address", value: or_not_provided(&p.address) },
            DetailLine { label: "Emergency contact", value: or_not_provided(&p.emergency_contact) },
            DetailLine { label: "Experience", value: opt(p.experience.map(|e| e.as_str())) },
            DetailLine { label: "Shirt size", value: opt(p.shirt_size.map(|s| s.as_str())) },
            DetailLine { label: "Shorts size", value: opt(p.shorts_size.map(|s| s.as_str())) },
            DetailLine { label: "Food preference", value: opt(p.food_preference.map(|f| f.as_str())) },
            DetailLine { label: "Accommodation", value: yes_no(p.needs_accommodation) },
            DetailLine { label: "Fee paid", value: yes_no(p.fee_paid) },
            DetailLine { label: "Medical notes", value: or_not_provided(&p.medical_notes) },
        ];
        let events = d
            .events
            .iter()
            .map(|e| EventCard {
                event: e.event.to_string(),
                partner: e.partner_name.clone().unwrap_or_else(|| NO_PARTNER.to_string()),
                ranking: e.ranking.map(|r| r.get()),
            })
            .collect();
        Self {
            player_id: p.id,
            name: p.name.clone(),
            details,
            events,
            registered_on: p
                .created_at
                .map(|t| format_date(Some(t.date_naive())))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

pub fn filter_registrations(all: &[Registration], filter: EventFilter) -> Vec<&Registration> {
    all.iter().filter(|r| filter.matches(r.event)).collect()
}

/// What the admin table should tell the user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    /// The backend holds no registrations at all.
    NoData,
    NoEventSelected,
    NoPlayersInEvent,
    Rows,
}

impl TableState {
    pub fn message(self, filter: EventFilter) -> Option<String> {
        match (self, filter.event()) {
            (TableState::NoData, _) => Some("No registrations found in the database.".to_string()),
            (TableState::NoEventSelected, _) => {
                Some("Select an event to view and manage player rankings.".to_string())
            }
            (TableState::NoPlayersInEvent, Some(e)) => {
                Some(format!("No players registered for {e} yet."))
            }
            _ => None,
        }
    }
}

pub fn table_state(all: &[Registration], filter: EventFilter) -> TableState {
    if all.is_empty() {
        return TableState::NoData;
    }
    match filter {
        EventFilter::All => TableState::NoEventSelected,
        EventFilter::Only(e) if !all.iter().any(|r| r.event == e) => TableState::NoPlayersInEvent,
        EventFilter::Only(_) => TableState::Rows,
    }
}

const CSV_HEADER: [&str; 9] = [
    "player_id",
    "player_name",
    "whatsapp_number",
    "email",
    "city",
    "event_name",
    "partner_id",
    "partner_name",
    "ranking",
];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    player_id: PlayerId,
    player_name: &'a str,
    whatsapp_number: &'a str,
    email: &'a str,
    city: &'a str,
    event_name: &'a str,
    partner_id: Option<PlayerId>,
    partner_name: &'a str,
    ranking: Option<u16>,
}

/// Table rows as CSV. The header line is written even when there are no rows.
pub fn registrations_csv(rows: &[&Registration]) -> Result<String, DashboardError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for r in rows {
        writer.serialize(CsvRow {
            player_id: r.player_id,
            player_name: &r.player_name,
            whatsapp_number: &r.phone,
            email: &r.email,
            city: &r.city,
            event_name: r.event.as_str(),
            partner_id: r.partner_id,
            partner_name: r.partner_name.as_deref().unwrap_or(""),
            ranking: r.ranking.map(|x| x.get()),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}
