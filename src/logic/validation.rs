//! Local, pre-submission checks on the profile and login forms.

use crate::models::{
    ExperienceLevel, FoodPreference, GarmentSize, Gender, Player, PlayerProfile,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Indian mobile number, optionally prefixed with +91, after whitespace is removed.
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+91)?[6-9]\d{9}$").expect("phone pattern is valid"));

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Raw step-1 form input, exactly as typed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub email: String,
    pub city: String,
    pub address: String,
    pub emergency_contact: String,
    pub experience: String,
    pub gender: String,
    pub shirt_size: String,
    pub shorts_size: String,
    pub food_preference: String,
    pub medical_notes: String,
    pub needs_accommodation: bool,
    pub fee_paid: bool,
}

impl ProfileForm {
    /// Prefill the form from an existing player (edit mode).
    pub fn from_player(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            phone: p.phone.clone(),
            date_of_birth: p
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            email: p.email.clone(),
            city: p.city.clone(),
            address: p.address.clone(),
            emergency_contact: p.emergency_contact.clone(),
            experience: p.experience.map(|e| e.as_str().to_string()).unwrap_or_default(),
            gender: p.gender.map(|g| g.as_str().to_string()).unwrap_or_default(),
            shirt_size: p.shirt_size.map(|s| s.as_str().to_string()).unwrap_or_default(),
            shorts_size: p.shorts_size.map(|s| s.as_str().to_string()).unwrap_or_default(),
            food_preference: p
                .food_preference
                .map(|f| f.as_str().to_string())
                .unwrap_or_default(),
            medical_notes: p.medical_notes.clone(),
            needs_accommodation: p.needs_accommodation,
            fee_paid: p.fee_paid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Phone,
    DateOfBirth,
    Email,
    City,
    Address,
    EmergencyContact,
    Experience,
}

/// Field-scoped messages; one per failing field.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Error)]
#[error("{count} field(s) need attention", count = .0.len())]
pub struct ProfileErrors(pub BTreeMap<ProfileField, &'static str>);

impl ProfileErrors {
    pub fn get(&self, field: ProfileField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn add(&mut self, field: ProfileField, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Strip all whitespace, as the phone pattern expects.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_valid_phone(raw: &str) -> bool {
    PHONE.is_match(&normalize_phone(raw))
}

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL.is_match(raw)
}

fn check_phone(errors: &mut ProfileErrors, raw: &str) {
    if raw.trim().is_empty() {
        errors.add(ProfileField::Phone, "WhatsApp number is required");
    } else if !is_valid_phone(raw) {
        errors.add(ProfileField::Phone, "Please enter a valid WhatsApp number");
    }
}

fn check_birth_date(errors: &mut ProfileErrors, raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(ProfileField::DateOfBirth, "Date of birth is required");
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.add(ProfileField::DateOfBirth, "Please enter a valid date of birth");
            None
        }
    }
}

fn require(errors: &mut ProfileErrors, field: ProfileField, raw: &str, message: &'static str) {
    if raw.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Validate step 1. On success every required field is present and well-formed.
pub fn validate_profile(form: &ProfileForm) -> Result<PlayerProfile, ProfileErrors> {
    let mut errors = ProfileErrors::default();

    require(&mut errors, ProfileField::Name, &form.name, "Full name is required");
    check_phone(&mut errors, &form.phone);
    let date_of_birth = check_birth_date(&mut errors, &form.date_of_birth);

    if form.email.trim().is_empty() {
        errors.add(ProfileField::Email, "Email is required");
    } else if !is_valid_email(form.email.trim()) {
        errors.add(ProfileField::Email, "Please enter a valid email address");
    }

    require(&mut errors, ProfileField::City, &form.city, "City is required");
    require(&mut errors, ProfileField::Address, &form.address, "Address is required");
    require(
        &mut errors,
        ProfileField::EmergencyContact,
        &form.emergency_contact,
        "Emergency contact is required",
    );

    let experience = ExperienceLevel::parse(&form.experience);
    if experience.is_none() {
        errors.add(ProfileField::Experience, "Playing experience is required");
    }

    match (date_of_birth, experience) {
        (Some(date_of_birth), Some(experience)) if errors.is_empty() => Ok(PlayerProfile {
            name: form.name.trim().to_string(),
            phone: normalize_phone(&form.phone),
            date_of_birth,
            email: form.email.trim().to_string(),
            city: form.city.trim().to_string(),
            address: form.address.trim().to_string(),
            emergency_contact: form.emergency_contact.trim().to_string(),
            experience,
            gender: Gender::parse(&form.gender),
            shirt_size: GarmentSize::parse(&form.shirt_size),
            shorts_size: GarmentSize::parse(&form.shorts_size),
            food_preference: FoodPreference::parse(&form.food_preference),
            needs_accommodation: form.needs_accommodation,
            fee_paid: form.fee_paid,
            medical_notes: form.medical_notes.trim().to_string(),
        }),
        _ => Err(errors),
    }
}

/// Validate the player login form; returns the normalized phone and parsed birth date.
pub fn validate_login(phone: &str, date_of_birth: &str) -> Result<(String, NaiveDate), ProfileErrors> {
    let mut errors = ProfileErrors::default();
    check_phone(&mut errors, phone);
    let date = check_birth_date(&mut errors, date_of_birth);
    match date {
        Some(date) => errors.into_result(|| (normalize_phone(phone), date)),
        None => Err(errors),
    }
}
