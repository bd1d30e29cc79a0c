//! The five tournament categories and the gender rules tied to their names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Player gender, used only to narrow event and partner lists.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Lenient parse of wire/form values; anything unrecognised is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Singles forbid a partner; doubles (including mixed) require one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    Singles,
    Doubles,
}

/// Fixed set of tournament categories. Serialized with the display name the backend stores.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "Men's Singles")]
    MensSingles,
    #[serde(rename = "Women's Singles")]
    WomensSingles,
    #[serde(rename = "Men's Doubles")]
    MensDoubles,
    #[serde(rename = "Women's Doubles")]
    WomensDoubles,
    #[serde(rename = "Mixed Doubles")]
    MixedDoubles,
}

impl EventName {
    pub const ALL: [EventName; 5] = [
        EventName::MensSingles,
        EventName::WomensSingles,
        EventName::MensDoubles,
        EventName::WomensDoubles,
        EventName::MixedDoubles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventName::MensSingles => "Men's Singles",
            EventName::WomensSingles => "Women's Singles",
            EventName::MensDoubles => "Men's Doubles",
            EventName::WomensDoubles => "Women's Doubles",
            EventName::MixedDoubles => "Mixed Doubles",
        }
    }

    pub fn kind(self) -> EventKind {
        match self {
            EventName::MensSingles | EventName::WomensSingles => EventKind::Singles,
            _ => EventKind::Doubles,
        }
    }

    pub fn is_singles(self) -> bool {
        self.kind() == EventKind::Singles
    }

    pub fn is_doubles(self) -> bool {
        self.kind() == EventKind::Doubles
    }

    /// Gender that partners for this event must have. `None` for mixed doubles (anyone).
    pub fn partner_gender(self) -> Option<Gender> {
        match self {
            EventName::MensSingles | EventName::MensDoubles => Some(Gender::Male),
            EventName::WomensSingles | EventName::WomensDoubles => Some(Gender::Female),
            EventName::MixedDoubles => None,
        }
    }

    /// Whether a player of `gender` may enter this event. Unknown gender may enter any.
    pub fn open_to(self, gender: Option<Gender>) -> bool {
        match (gender, self.partner_gender()) {
            (Some(g), Some(required)) => g == required,
            _ => true,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown event: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventName {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        EventName::ALL
            .into_iter()
            .find(|e| e.as_str() == trimmed)
            .ok_or_else(|| UnknownEvent(trimmed.to_string()))
    }
}

/// Events a player may choose from, keeping the input order.
pub fn events_for_gender(events: &[EventName], gender: Option<Gender>) -> Vec<EventName> {
    events.iter().copied().filter(|e| e.open_to(gender)).collect()
}
