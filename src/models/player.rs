//! Player and the validated profile data sent when creating or editing one.

use crate::models::event::Gender;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the backend.
pub type PlayerId = i64;

/// Self-declared playing experience tier.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    /// 0-2 years.
    Beginner,
    /// 3-5 years.
    Intermediate,
    /// 6-10 years.
    Advanced,
    /// 10+ years.
    Professional,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Professional => "professional",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            "professional" => Some(ExperienceLevel::Professional),
            _ => None,
        }
    }
}

/// Shirt and shorts sizes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GarmentSize {
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl GarmentSize {
    pub fn as_str(self) -> &'static str {
        match self {
            GarmentSize::Xs => "XS",
            GarmentSize::S => "S",
            GarmentSize::M => "M",
            GarmentSize::L => "L",
            GarmentSize::Xl => "XL",
            GarmentSize::Xxl => "XXL",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "XS" => Some(GarmentSize::Xs),
            "S" => Some(GarmentSize::S),
            "M" => Some(GarmentSize::M),
            "L" => Some(GarmentSize::L),
            "XL" => Some(GarmentSize::Xl),
            "XXL" => Some(GarmentSize::Xxl),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodPreference {
    Vegetarian,
    NonVegetarian,
    Vegan,
    Jain,
}

impl FoodPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            FoodPreference::Vegetarian => "vegetarian",
            FoodPreference::NonVegetarian => "non-vegetarian",
            FoodPreference::Vegan => "vegan",
            FoodPreference::Jain => "jain",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vegetarian" => Some(FoodPreference::Vegetarian),
            "non-vegetarian" => Some(FoodPreference::NonVegetarian),
            "vegan" => Some(FoodPreference::Vegan),
            "jain" => Some(FoodPreference::Jain),
            _ => None,
        }
    }
}

/// Profile fields that passed local validation, ready to be created or updated on the backend.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    /// Whitespace-stripped WhatsApp number.
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub city: String,
    pub address: String,
    pub emergency_contact: String,
    pub experience: ExperienceLevel,
    pub gender: Option<Gender>,
    pub shirt_size: Option<GarmentSize>,
    pub shorts_size: Option<GarmentSize>,
    pub food_preference: Option<FoodPreference>,
    pub needs_accommodation: bool,
    pub fee_paid: bool,
    pub medical_notes: String,
}

/// A registered player as the rest of the app sees it (single canonical shape).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub date_of_birth: Option<NaiveDate>,
    pub city: String,
    pub gender: Option<Gender>,
    pub shirt_size: Option<GarmentSize>,
    pub shorts_size: Option<GarmentSize>,
    pub food_preference: Option<FoodPreference>,
    pub needs_accommodation: bool,
    pub fee_paid: bool,
    pub experience: Option<ExperienceLevel>,
    pub medical_notes: String,
    pub created_at: Option<DateTime<Utc>>,
}
