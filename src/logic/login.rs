//! Admin and player login, and the startup check of a stored admin token.

use crate::api::{AdminIdentity, ApiError, TournamentApi};
use crate::logic::validation::{validate_login, ProfileErrors};
use crate::models::PlayerDashboard;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Please correct the highlighted fields")]
    Invalid(#[from] ProfileErrors),
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Invalid WhatsApp number or date of birth. Please check your credentials.")]
    InvalidCredentials,
    #[error(
        "This WhatsApp number is registered with a different date of birth. \
         Please check your date of birth or contact support."
    )]
    BirthDateMismatch,
    #[error(
        "No registration found with these credentials. \
         Please register first or check your information."
    )]
    NotRegistered,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Where a stored admin token stands after the startup probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSessionState {
    /// No token, or the backend rejected it and it was cleared.
    Anonymous,
    Active,
    /// The backend could not confirm the token either way; it is kept for a later try.
    Unverified,
}

pub async fn admin_login<A: TournamentApi>(
    api: &A,
    username: &str,
    password: &str,
) -> Result<AdminIdentity, LoginError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }
    api.login(username, password).await.map_err(|e| {
        log::warn!("admin login for {username} failed: {e}");
        LoginError::Api(e)
    })
}

/// Check a stored token with a cheap authenticated call, dropping it only when the backend
/// refuses it. Outages and server errors leave it in place as `Unverified`.
pub async fn restore_admin_session<A: TournamentApi>(api: &A) -> AdminSessionState {
    if !api.is_authenticated() {
        return AdminSessionState::Anonymous;
    }
    match api.probe().await {
        Ok(()) => AdminSessionState::Active,
        Err(
            e @ (ApiError::AuthenticationFailed
            | ApiError::AccessDenied(_)
            | ApiError::NotAuthenticated),
        ) => {
            log::info!("stored admin token rejected ({e}); clearing it");
            api.logout();
            AdminSessionState::Anonymous
        }
        // Says nothing about the token itself.
        Err(e) => {
            log::warn!("could not verify stored admin token: {e}");
            AdminSessionState::Unverified
        }
    }
}

fn player_login_error(e: ApiError) -> LoginError {
    if matches!(e, ApiError::AuthenticationFailed) {
        return LoginError::InvalidCredentials;
    }
    match e.backend_message() {
        Some(m) if m.contains("WhatsApp number is already registered") => {
            LoginError::BirthDateMismatch
        }
        Some(m) if m.contains("No registration found") => LoginError::NotRegistered,
        _ => LoginError::Api(e),
    }
}

/// Identify a player by phone and birth date. No token is involved.
pub async fn player_login<A: TournamentApi>(
    api: &A,
    phone: &str,
    date_of_birth: &str,
) -> Result<PlayerDashboard, LoginError> {
    let (phone, date_of_birth) = validate_login(phone, date_of_birth)?;
    match api.player_login(&phone, date_of_birth).await {
        Ok(Some(dashboard)) => {
            log::info!("player {} logged in", dashboard.player.id);
            Ok(dashboard)
        }
        Ok(None) => Err(LoginError::InvalidCredentials),
        Err(e) => Err(player_login_error(e)),
    }
}
