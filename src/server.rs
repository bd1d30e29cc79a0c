//! actix-web front for the registration workflows: JSON endpoints for the wizard, the logins and
//! the admin dashboard. The admin token lives in a signed session cookie.

use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session as CookieSession, SessionMiddleware};
use actix_web::{
    cookie::{time, Key},
    get,
    http::StatusCode,
    post,
    web::{Data, Json, Path, Query, ServiceConfig},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{ApiClient, ApiError, Session, TokenStore, TournamentApi, AUTH_TOKEN_KEY};
use crate::config::AppConfig;
use crate::logic::{
    admin_login, available_partners, filter_registrations, guard_leave, player_login,
    registrations_csv, restore_admin_session, table_state, EventFilter, EventSelection, LoginError,
    PlayerDashboardView, ProfileForm, RankingBoard, RankingKey, RegistrationWizard, WizardError,
    WizardMode,
};
use crate::models::{events_for_gender, EventName, Gender, PlayerId, Registration};

pub const SESSION_COOKIE: &str = "tournament_session";

/// Shared across workers: settings plus one connection pool to the backend.
pub struct AppState {
    config: AppConfig,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

type State = Data<AppState>;

/// Persists the backend token in the signed session cookie.
struct CookieTokenStore(CookieSession);

impl TokenStore for CookieTokenStore {
    fn load(&self) -> Option<String> {
        match self.0.get::<String>(AUTH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                log::warn!("unreadable session cookie: {e}");
                None
            }
        }
    }

    fn save(&self, token: &str) {
        if let Err(e) = self.0.insert(AUTH_TOKEN_KEY, token) {
            log::warn!("could not store token in session cookie: {e}");
        }
    }

    fn clear(&self) {
        self.0.remove(AUTH_TOKEN_KEY);
    }
}

/// Client whose token lives in the caller's cookie.
fn client_for(state: &AppState, cookie: CookieSession) -> Result<ApiClient, HttpResponse> {
    client_with(state, Session::restore(CookieTokenStore(cookie)))
}

fn client_with(state: &AppState, session: Session) -> Result<ApiClient, HttpResponse> {
    ApiClient::new(state.http.clone(), &state.config.api_base_url, session)
        .map_err(|e| error_json(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
}

pub fn error_json(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": message }))
}

/// Backend failures: 401/403/404 and client errors pass through, timeouts are 504, the rest 502.
pub fn api_error_response(e: &ApiError) -> HttpResponse {
    let status = match e {
        ApiError::AuthenticationFailed | ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ApiError::AccessDenied(_) => StatusCode::FORBIDDEN,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ApiError::InvalidBaseUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ApiError::Http { status, .. } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        _ => StatusCode::BAD_GATEWAY,
    };
    error_json(status, &e.to_string())
}

/// 422 with `{"error": .., "errors": {field: message}}`.
pub fn field_errors<T: Serialize>(message: &str, errors: &T) -> HttpResponse {
    HttpResponse::UnprocessableEntity()
        .json(serde_json::json!({ "error": message, "errors": errors }))
}

pub fn wizard_error_response(e: &WizardError) -> HttpResponse {
    match e {
        WizardError::Invalid(errors) => field_errors(&e.to_string(), errors),
        WizardError::Selection(_) | WizardError::MissingPlayerId => {
            error_json(StatusCode::BAD_REQUEST, &e.to_string())
        }
        WizardError::Conflict(_) | WizardError::WrongStep(_) => {
            error_json(StatusCode::CONFLICT, &e.to_string())
        }
        WizardError::Api(api) => api_error_response(api),
    }
}

pub fn login_error_response(e: &LoginError) -> HttpResponse {
    match e {
        LoginError::Invalid(errors) => field_errors(&e.to_string(), errors),
        LoginError::MissingCredentials => error_json(StatusCode::BAD_REQUEST, &e.to_string()),
        LoginError::InvalidCredentials
        | LoginError::BirthDateMismatch
        | LoginError::NotRegistered => error_json(StatusCode::UNAUTHORIZED, &e.to_string()),
        LoginError::Api(api) => api_error_response(api),
    }
}

/// `?event=` value: absent or empty means every event.
fn parse_event_filter(raw: Option<&str>) -> Result<EventFilter, HttpResponse> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(EventFilter::All),
        Some(name) => name
            .parse::<EventName>()
            .map(EventFilter::Only)
            .map_err(|e| error_json(StatusCode::BAD_REQUEST, &e.to_string())),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct GenderQuery {
    gender: Option<String>,
}

#[derive(Deserialize)]
struct EventQuery {
    event: Option<String>,
}

#[derive(Deserialize)]
struct PartnersQuery {
    player_id: PlayerId,
    current_partner: Option<PlayerId>,
}

#[derive(Deserialize)]
struct ProfileBody {
    mode: Option<WizardMode>,
    player_id: Option<PlayerId>,
    #[serde(flatten)]
    form: ProfileForm,
}

#[derive(Deserialize)]
struct EventsBody {
    mode: Option<WizardMode>,
    player_id: Option<PlayerId>,
    gender: Option<Gender>,
    #[serde(flatten)]
    selection: EventSelection,
}

#[derive(Deserialize)]
struct PlayerLoginBody {
    phone: String,
    date_of_birth: String,
}

#[derive(Deserialize)]
struct AdminLoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LogoutBody {
    pending_changes: bool,
    confirmed: bool,
}

#[derive(Deserialize)]
struct CreateEventBody {
    event_name: EventName,
}

#[derive(Deserialize)]
struct RankingsBody {
    event: Option<EventName>,
    #[serde(default)]
    edits: BTreeMap<RankingKey, String>,
}

#[derive(Deserialize)]
struct CopyRankingBody {
    event: Option<EventName>,
    player_id: PlayerId,
    value: String,
    #[serde(default)]
    edits: BTreeMap<RankingKey, String>,
}

/// One admin table row with the key its ranking input edits.
#[derive(Serialize)]
struct AdminRow<'a> {
    key: RankingKey,
    #[serde(flatten)]
    registration: &'a Registration,
}

fn admin_table(board: &RankingBoard) -> serde_json::Value {
    let filter = board.filter();
    let state = table_state(board.registrations(), filter);
    let rows: Vec<AdminRow> = filter_registrations(board.registrations(), filter)
        .into_iter()
        .map(|r| AdminRow {
            key: board.key_for(r),
            registration: r,
        })
        .collect();
    serde_json::json!({
        "event": filter.event(),
        "state": state,
        "message": state.message(filter),
        "rows": rows,
        "teams": board.teams(),
    })
}

/// Board for `event` with the request's edits applied; bad inputs come back keyed by row.
fn board_with_edits(
    registrations: Vec<Registration>,
    event: Option<EventName>,
    edits: &BTreeMap<RankingKey, String>,
) -> Result<RankingBoard, HttpResponse> {
    let mut board = RankingBoard::new(registrations);
    board.select(EventFilter::from(event));
    let mut errors = BTreeMap::new();
    for (key, value) in edits {
        if let Err(e) = board.set_ranking(*key, value) {
            errors.insert(key.to_string(), e.to_string());
        }
    }
    if errors.is_empty() {
        Ok(board)
    } else {
        Err(field_errors("Invalid ranking input", &errors))
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-registration-web",
    })
}

#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Event list, narrowed to what a player of `gender` may enter.
#[get("/api/events")]
async fn api_events(state: State, query: Query<GenderQuery>) -> HttpResponse {
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let gender = query.gender.as_deref().and_then(Gender::parse);
    match api.list_events().await {
        Ok(events) => HttpResponse::Ok().json(events_for_gender(&events, gender)),
        Err(e) => api_error_response(&e),
    }
}

/// Step 1: validate the profile, then create or update the player.
#[post("/api/register/profile")]
async fn api_register_profile(state: State, body: Json<ProfileBody>) -> HttpResponse {
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    let mut wizard = RegistrationWizard::reopen(body.mode.unwrap_or(WizardMode::New), body.player_id);
    match wizard.submit_profile(&api, body.form).await {
        Ok(player_id) => HttpResponse::Ok().json(serde_json::json!({
            "player_id": player_id,
            "mode": wizard.mode(),
            "step": wizard.step(),
            "gender": wizard.gender(),
        })),
        Err(e) => wizard_error_response(&e),
    }
}

/// Step 2 partner list. Never fails on backend errors; the list is just empty.
#[get("/api/register/partners/{event}")]
async fn api_register_partners(
    state: State,
    path: Path<String>,
    query: Query<PartnersQuery>,
) -> HttpResponse {
    let event: EventName = match path.parse() {
        Ok(e) => e,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let options = available_partners(&api, event, query.player_id, query.current_partner).await;
    HttpResponse::Ok().json(options)
}

/// Step 2: save the chosen events and partners.
#[post("/api/register/events")]
async fn api_register_events(state: State, body: Json<EventsBody>) -> HttpResponse {
    let body = body.into_inner();
    let Some(player_id) = body.player_id else {
        return wizard_error_response(&WizardError::MissingPlayerId);
    };
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let mode = body.mode.unwrap_or(WizardMode::New);
    let mut wizard = RegistrationWizard::resume(mode, player_id, body.gender);
    match wizard.submit_events(&api, body.selection).await {
        Ok(links) => HttpResponse::Ok().json(serde_json::json!({
            "player_id": player_id,
            "step": wizard.step(),
            "links": links,
        })),
        Err(e) => wizard_error_response(&e),
    }
}

#[post("/api/login/player")]
async fn api_player_login(state: State, body: Json<PlayerLoginBody>) -> HttpResponse {
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match player_login(&api, &body.phone, &body.date_of_birth).await {
        Ok(dashboard) => HttpResponse::Ok().json(serde_json::json!({
            "view": PlayerDashboardView::from(&dashboard),
            "dashboard": dashboard,
        })),
        Err(e) => login_error_response(&e),
    }
}

#[get("/api/players/{id}/dashboard")]
async fn api_player_dashboard(state: State, path: Path<PlayerId>) -> HttpResponse {
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match api.player_dashboard(path.into_inner()).await {
        Ok(dashboard) => HttpResponse::Ok().json(serde_json::json!({
            "view": PlayerDashboardView::from(&dashboard),
            "dashboard": dashboard,
        })),
        Err(e) => api_error_response(&e),
    }
}

/// Prefill for the wizard in edit mode.
#[get("/api/players/{id}/edit")]
async fn api_player_edit(state: State, path: Path<PlayerId>) -> HttpResponse {
    let api = match client_with(&state, Session::ephemeral()) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match api.player_dashboard(path.into_inner()).await {
        Ok(dashboard) => {
            let wizard = RegistrationWizard::edit(&dashboard);
            HttpResponse::Ok().json(serde_json::json!({
                "mode": wizard.mode(),
                "step": wizard.step(),
                "player_id": wizard.player_id(),
                "gender": wizard.gender(),
                "form": wizard.form(),
                "selection": wizard.selection(),
            }))
        }
        Err(e) => api_error_response(&e),
    }
}

#[post("/api/login/admin")]
async fn api_admin_login(
    state: State,
    cookie: CookieSession,
    body: Json<AdminLoginBody>,
) -> HttpResponse {
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match admin_login(&api, &body.username, &body.password).await {
        Ok(identity) => HttpResponse::Ok().json(identity),
        Err(e) => login_error_response(&e),
    }
}

/// Drop the admin token. Refused while ranking edits are pending unless confirmed.
#[post("/api/logout")]
async fn api_logout(
    state: State,
    cookie: CookieSession,
    body: Option<Json<LogoutBody>>,
) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    if let Err(e) = guard_leave(body.pending_changes, body.confirmed) {
        return error_json(StatusCode::CONFLICT, &e.to_string());
    }
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    api.logout();
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

/// Startup check of the stored admin token.
#[get("/api/admin/session")]
async fn api_admin_session(state: State, cookie: CookieSession) -> HttpResponse {
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let session_state = restore_admin_session(&api).await;
    HttpResponse::Ok().json(serde_json::json!({ "state": session_state }))
}

#[get("/api/admin/registrations")]
async fn api_admin_registrations(
    state: State,
    cookie: CookieSession,
    query: Query<EventQuery>,
) -> HttpResponse {
    let filter = match parse_event_filter(query.event.as_deref()) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match api.all_registrations().await {
        Ok(registrations) => {
            let mut board = RankingBoard::new(registrations);
            board.select(filter);
            HttpResponse::Ok().json(admin_table(&board))
        }
        Err(e) => api_error_response(&e),
    }
}

#[get("/api/admin/registrations.csv")]
async fn api_admin_registrations_csv(
    state: State,
    cookie: CookieSession,
    query: Query<EventQuery>,
) -> HttpResponse {
    let filter = match parse_event_filter(query.event.as_deref()) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let registrations = match api.all_registrations().await {
        Ok(r) => r,
        Err(e) => return api_error_response(&e),
    };
    match registrations_csv(&filter_registrations(&registrations, filter)) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"registrations.csv\"",
            ))
            .body(csv),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Per-event counts, passed through from the backend.
#[get("/api/admin/statistics")]
async fn api_admin_statistics(state: State, cookie: CookieSession) -> HttpResponse {
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match api.event_statistics().await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => api_error_response(&e),
    }
}

#[post("/api/admin/events")]
async fn api_admin_create_event(
    state: State,
    cookie: CookieSession,
    body: Json<CreateEventBody>,
) -> HttpResponse {
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    match api.create_event(body.event_name).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "event_name": body.event_name })),
        Err(e) => api_error_response(&e),
    }
}

/// Save ranking edits for one view. Partial failures still answer 200; the report says which.
#[post("/api/admin/rankings")]
async fn api_admin_save_rankings(
    state: State,
    cookie: CookieSession,
    body: Json<RankingsBody>,
) -> HttpResponse {
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let registrations = match api.all_registrations().await {
        Ok(r) => r,
        Err(e) => return api_error_response(&e),
    };
    let mut board = match board_with_edits(registrations, body.event, &body.edits) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let report = board.save(&api).await;
    HttpResponse::Ok().json(serde_json::json!({
        "complete": report.is_complete_success(),
        "summary": report.summary(),
        "failed_players": report.failed_players(),
        "report": report,
        "table": admin_table(&board),
    }))
}

/// Preview "copy to all events": the edits after copying, nothing is saved.
#[post("/api/admin/rankings/copy")]
async fn api_admin_copy_ranking(
    state: State,
    cookie: CookieSession,
    body: Json<CopyRankingBody>,
) -> HttpResponse {
    let api = match client_for(&state, cookie) {
        Ok(api) => api,
        Err(resp) => return resp,
    };
    let registrations = match api.all_registrations().await {
        Ok(r) => r,
        Err(e) => return api_error_response(&e),
    };
    let mut board = match board_with_edits(registrations, body.event, &body.edits) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match board.copy_to_all_events(body.player_id, &body.value) {
        Ok(changed) => HttpResponse::Ok().json(serde_json::json!({
            "changed": changed,
            "edits": board.pending(),
            "unsaved": board.has_unsaved_changes(),
        })),
        Err(e) => error_json(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    }
}

/// Signed cookie session holding the backend token between requests.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
    ttl: time::Duration,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(cookie_secure)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}

/// Every JSON endpoint. Needs `Data<AppState>` and `session_middleware` on the app.
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(api_health)
        .service(favicon)
        .service(api_events)
        .service(api_register_profile)
        .service(api_register_partners)
        .service(api_register_events)
        .service(api_player_login)
        .service(api_player_dashboard)
        .service(api_player_edit)
        .service(api_admin_login)
        .service(api_logout)
        .service(api_admin_session)
        .service(api_admin_registrations_csv)
        .service(api_admin_registrations)
        .service(api_admin_statistics)
        .service(api_admin_create_event)
        .service(api_admin_save_rankings)
        .service(api_admin_copy_ranking);
}
