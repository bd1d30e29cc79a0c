//! reqwest-backed implementation of `TournamentApi`.

use super::error::ApiError;
use super::session::Session;
use super::wire;
use super::TournamentApi;
use crate::models::{
    EventLink, EventName, Gender, PartnerOption, PlayerDashboard, PlayerId, PlayerProfile, Ranking,
    Registration,
};
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One row of `/admin/statistics`, passed through untouched.
pub type StatisticsRow = serde_json::Map<String, serde_json::Value>;

/// Who the backend says logged in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AdminIdentity {
    pub username: String,
    pub role: Option<String>,
}

/// Shared connection pool with the per-request deadline applied.
pub fn http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ApiError::Network)
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(http: Client, base_url: &str, session: Session) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url: parsed,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Base URL with `segments` appended, each percent-encoded (event names contain spaces).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let token = self.session.token();
        log::debug!(
            "{} {} (token {})",
            method,
            url.path(),
            if token.is_some() { "present" } else { "missing" }
        );
        let req = self.http.request(method, url);
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send and translate non-2xx statuses. A 401 clears the session before returning.
    async fn checked(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("backend answered 401; clearing stored token");
            self.session.clear();
            return Err(ApiError::AuthenticationFailed);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        log::warn!("backend error {}: {}", status.as_u16(), message);
        Err(ApiError::from_status(status, message))
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        Ok(self.checked(req).await?.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.fetch(self.request(Method::GET, url)).await
    }

    /// Send a JSON body and ignore whatever acknowledgement comes back.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        self.checked(self.request(method, url).json(body)).await?;
        Ok(())
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }

    /// Add an event to the backend's event table (admin).
    pub async fn create_event(&self, event: EventName) -> Result<(), ApiError> {
        self.require_token()?;
        self.send(
            Method::POST,
            &["events"],
            &wire::EventPayload {
                event_name: event.as_str(),
            },
        )
        .await
    }

    pub async fn event_statistics(&self) -> Result<Vec<StatisticsRow>, ApiError> {
        self.require_token()?;
        self.get(&["admin", "statistics"]).await
    }
}

/// Error text from a failed response: `error`, then `message`, else a generic status line.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<wire::ErrorBody>(body) {
        Ok(parsed) => parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| "API request failed".to_string()),
        Err(_) => match status.canonical_reason() {
            Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        },
    }
}

impl TournamentApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<AdminIdentity, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let req = self
            .request(Method::POST, url)
            .json(&wire::LoginRequest { username, password });
        let response: wire::LoginResponse = match self.fetch(req).await {
            Ok(r) => r,
            Err(e) => {
                self.session.clear();
                return Err(e);
            }
        };
        let Some(token) = response.access_token.filter(|t| !t.is_empty()) else {
            self.session.clear();
            return Err(ApiError::MissingToken);
        };
        self.session.set_token(token);
        log::info!("admin {username} logged in");
        let user = response.user;
        Ok(AdminIdentity {
            username: user
                .as_ref()
                .and_then(|u| u.username.clone())
                .unwrap_or_else(|| username.to_string()),
            role: user.and_then(|u| u.role),
        })
    }

    async fn player_login(
        &self,
        phone: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<PlayerDashboard>, ApiError> {
        let url = self.endpoint(&["auth", "user-login"])?;
        let req = self.request(Method::POST, url).json(&wire::PlayerLoginRequest {
            whatsapp: phone,
            date_of_birth: date_of_birth.format("%Y-%m-%d").to_string(),
        });
        let response: wire::PlayerLoginResponse = self.fetch(req).await?;
        if !response.success {
            return Ok(None);
        }
        Ok(response.user.map(PlayerDashboard::from))
    }

    async fn probe(&self) -> Result<(), ApiError> {
        self.require_token()?;
        let url = self.endpoint(&["admin", "registrations"])?;
        self.checked(self.request(Method::GET, url)).await?;
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<EventName>, ApiError> {
        let rows: Vec<wire::EventWire> = self.get(&["events"]).await?;
        Ok(wire::events(rows))
    }

    async fn create_player(&self, profile: &PlayerProfile) -> Result<PlayerId, ApiError> {
        let url = self.endpoint(&["players"])?;
        let req = self
            .request(Method::POST, url)
            .json(&wire::PlayerPayload::from(profile));
        let created: wire::CreatedWire = self.fetch(req).await?;
        created
            .id
            .ok_or_else(|| ApiError::Decode("player created without an id".to_string()))
    }

    async fn update_player(
        &self,
        id: PlayerId,
        profile: &PlayerProfile,
    ) -> Result<PlayerId, ApiError> {
        let url = self.endpoint(&["players", &id.to_string()])?;
        let req = self
            .request(Method::PUT, url)
            .json(&wire::PlayerPayload::from(profile));
        let echoed: wire::CreatedWire = self.fetch(req).await?;
        Ok(echoed.id.unwrap_or(id))
    }

    async fn player_dashboard(&self, id: PlayerId) -> Result<PlayerDashboard, ApiError> {
        let raw: wire::DashboardWire = self.get(&["players", "dashboard", &id.to_string()]).await?;
        Ok(PlayerDashboard::from(raw))
    }

    async fn available_partners(
        &self,
        event: EventName,
        player: PlayerId,
        gender: Option<Gender>,
    ) -> Result<Vec<PartnerOption>, ApiError> {
        let mut url = self.endpoint(&["partners", "available", event.as_str(), &player.to_string()])?;
        if let Some(g) = gender {
            url.query_pairs_mut().append_pair("gender", g.as_str());
        }
        let rows: Vec<wire::AvailablePartnerWire> =
            self.fetch(self.request(Method::GET, url)).await?;
        Ok(wire::partner_options(rows))
    }

    async fn create_partner_link(&self, link: &EventLink) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            &["partners"],
            &wire::PartnerLinkPayload::from(link),
        )
        .await
    }

    async fn update_partner_relationship(
        &self,
        event: EventName,
        player: PlayerId,
        partner: PlayerId,
    ) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            &["partners", "update-relationship"],
            &wire::RelationshipPayload {
                event_name: event.as_str(),
                user1_id: player,
                user2_id: partner,
            },
        )
        .await
    }

    async fn delete_player_links(&self, player: PlayerId) -> Result<(), ApiError> {
        let url = self.endpoint(&["partners", "user", &player.to_string()])?;
        self.checked(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn update_ranking(
        &self,
        player: PlayerId,
        event: EventName,
        ranking: Ranking,
    ) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            &["partners", "update-ranking"],
            &wire::RankingPayload {
                player_id: player,
                event_name: event.as_str(),
                ranking: ranking.into(),
            },
        )
        .await
    }

    async fn all_registrations(&self) -> Result<Vec<Registration>, ApiError> {
        self.require_token()?;
        let rows: Vec<wire::RegistrationWire> = self.get(&["admin", "registrations"]).await?;
        Ok(wire::registrations(rows))
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn logout(&self) {
        log::info!("logging out; clearing stored token");
        self.session.clear();
    }
}
