//! The JSON front end driven through `actix_web::test`, against an in-process stand-in backend.

use actix_web::cookie::{time, Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::time::Duration;
use tournament_registration_web::api::{http_client, ApiError};
use tournament_registration_web::config::AppConfig;
use tournament_registration_web::logic::{LoginError, ProfileErrors, ProfileField, WizardError};
use tournament_registration_web::server::{
    api_error_response, login_error_response, routes, session_middleware, wizard_error_response,
    AppState, SESSION_COOKIE,
};

const TOKEN: &str = "tok-admin";

async fn login(body: web::Json<Value>) -> HttpResponse {
    if body["password"] == "secret" {
        HttpResponse::Ok().json(json!({
            "access_token": TOKEN,
            "user": { "username": body["username"], "role": "admin" }
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({ "error": "Invalid credentials" }))
    }
}

async fn registrations(req: HttpRequest) -> HttpResponse {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());
    if bearer != Some("Bearer tok-admin") {
        return HttpResponse::Unauthorized().json(json!({ "error": "Token has expired" }));
    }
    HttpResponse::Ok().json(json!([
        {
            "player_id": 101, "player_name": "Arjun", "event_name": "Men's Doubles",
            "partner_id": 102, "partner_name": "Bilal", "ranking": null
        },
        {
            "player_id": 102, "player_name": "Bilal", "event_name": "Men's Doubles",
            "partner_id": 101, "partner_name": "Arjun", "ranking": null
        },
        {
            "player_id": 104, "player_name": "Dev", "event_name": "Men's Singles",
            "partner_id": null, "partner_name": null, "ranking": 7
        }
    ]))
}

/// Player 102's row cannot be written.
async fn update_ranking(body: web::Json<Value>) -> HttpResponse {
    if body["player_id"] == 102 {
        HttpResponse::InternalServerError().json(json!({ "error": "Database error" }))
    } else {
        HttpResponse::Ok().json(json!({ "message": "Ranking updated" }))
    }
}

async fn dashboard(path: web::Path<i64>) -> HttpResponse {
    match path.into_inner() {
        3 => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            HttpResponse::Ok().json(json!({ "player": { "id": 3 }, "events": [] }))
        }
        7 => HttpResponse::Ok().json(json!({
            "player": { "id": 7, "name": "Asha", "whatsapp_number": "9876543210" },
            "events": [
                { "event_name": "Women's Singles", "partner_id": null, "partner_name": null, "ranking": null }
            ]
        })),
        401 => HttpResponse::Unauthorized().json(json!({ "error": "Token has expired" })),
        403 => HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })),
        500 => HttpResponse::InternalServerError()
            .json(json!({ "error": "Database connection failed" })),
        _ => HttpResponse::NotFound().json(json!({ "error": "Player not found" })),
    }
}

fn backend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/login", web::post().to(login))
        .route("/admin/registrations", web::get().to(registrations))
        .route("/partners/update-ranking", web::post().to(update_ranking))
        .route("/players/dashboard/{id}", web::get().to(dashboard));
}

/// Start the stand-in backend and return its API base URL.
async fn start_backend() -> String {
    let server = HttpServer::new(|| App::new().service(web::scope("/api").configure(backend_routes)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind test backend");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}/api")
}

fn state(base: &str, timeout: Duration) -> web::Data<AppState> {
    let config = AppConfig {
        api_base_url: base.to_string(),
        request_timeout: timeout,
        ..AppConfig::default()
    };
    let http = http_client(timeout).unwrap();
    web::Data::new(AppState::new(config, http))
}

macro_rules! front {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .wrap(session_middleware(Key::generate(), false, time::Duration::hours(1)))
                .configure(routes),
        )
        .await
    };
}

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("session cookie set")
}

#[actix_web::test]
async fn health_answers_without_a_backend() {
    let app = front!(state("http://127.0.0.1:9/api", Duration::from_secs(1)));
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], true);
}

#[actix_web::test]
async fn backend_statuses_are_mirrored_or_become_bad_gateway() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_secs(5)));

    for (id, expected) in [
        (401, StatusCode::UNAUTHORIZED),
        (403, StatusCode::FORBIDDEN),
        (404, StatusCode::NOT_FOUND),
        (500, StatusCode::BAD_GATEWAY),
    ] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/players/{id}/dashboard"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "player {id}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string(), "player {id}: {body}");
    }
}

#[actix_web::test]
async fn player_dashboard_carries_the_view() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_secs(5)));

    let req = test::TestRequest::get().uri("/api/players/7/dashboard").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["view"]["name"], "Asha");
    assert_eq!(body["view"]["events"][0]["partner"], "No partner assigned");
    assert_eq!(body["view"]["registered_on"], "Not available");
}

#[actix_web::test]
async fn slow_backend_is_a_gateway_timeout() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_millis(200)));

    let req = test::TestRequest::get().uri("/api/players/3/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[actix_web::test]
async fn invalid_profile_lists_field_errors() {
    let app = front!(state("http://127.0.0.1:9/api", Duration::from_secs(1)));

    let req = test::TestRequest::post()
        .uri("/api/register/profile")
        .set_json(json!({ "name": "Asha", "phone": "123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["phone"], "Please enter a valid WhatsApp number");
    assert_eq!(body["errors"]["email"], "Email is required");
    assert!(body["errors"].get("name").is_none());
}

#[actix_web::test]
async fn logout_with_pending_edits_needs_confirmation() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_secs(5)));

    let login = test::TestRequest::post()
        .uri("/api/login/admin")
        .set_json(json!({ "username": "admin", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, login).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);

    let refused = test::TestRequest::post()
        .uri("/api/logout")
        .cookie(cookie.clone())
        .set_json(json!({ "pending_changes": true, "confirmed": false }))
        .to_request();
    let resp = test::call_service(&app, refused).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Still logged in.
    let check = test::TestRequest::get()
        .uri("/api/admin/session")
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, check).await;
    assert_eq!(body["state"], "active");

    let confirmed = test::TestRequest::post()
        .uri("/api/logout")
        .cookie(cookie)
        .set_json(json!({ "pending_changes": true, "confirmed": true }))
        .to_request();
    let resp = test::call_service(&app, confirmed).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn admin_routes_need_a_login() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_secs(5)));

    let req = test::TestRequest::get().uri("/api/admin/registrations").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/admin/session").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "anonymous");
}

#[actix_web::test]
async fn partial_ranking_save_still_answers_ok() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_secs(5)));

    let login = test::TestRequest::post()
        .uri("/api/login/admin")
        .set_json(json!({ "username": "admin", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, login).await;
    let cookie = session_cookie(&resp);

    let save = test::TestRequest::post()
        .uri("/api/admin/rankings")
        .cookie(cookie)
        .set_json(json!({ "event": "Men's Doubles", "edits": { "101-102": "5" } }))
        .to_request();
    let resp = test::call_service(&app, save).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["complete"], false);
    assert_eq!(body["failed_players"], json!([102]));
    assert_eq!(body["table"]["rows"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn bad_ranking_input_is_unprocessable() {
    let base = start_backend().await;
    let app = front!(state(&base, Duration::from_secs(5)));

    let login = test::TestRequest::post()
        .uri("/api/login/admin")
        .set_json(json!({ "username": "admin", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, login).await;
    let cookie = session_cookie(&resp);

    let save = test::TestRequest::post()
        .uri("/api/admin/rankings")
        .cookie(cookie)
        .set_json(json!({ "event": "Men's Singles", "edits": { "104-Men's Singles": "1001" } }))
        .to_request();
    let resp = test::call_service(&app, save).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["104-Men's Singles"].is_string());
}

#[::core::prelude::v1::test]
fn error_kinds_map_to_statuses() {
    let server = ApiError::Server {
        status: 503,
        message: "down".to_string(),
    };
    assert_eq!(api_error_response(&ApiError::Timeout).status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(api_error_response(&server).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        api_error_response(&ApiError::Http {
            status: 409,
            message: "taken".to_string()
        })
        .status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        api_error_response(&ApiError::NotAuthenticated).status(),
        StatusCode::UNAUTHORIZED
    );

    let mut errors = ProfileErrors::default();
    errors.0.insert(ProfileField::Email, "Email is required");
    assert_eq!(
        wizard_error_response(&WizardError::Invalid(errors)).status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        wizard_error_response(&WizardError::MissingPlayerId).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        login_error_response(&LoginError::InvalidCredentials).status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login_error_response(&LoginError::MissingCredentials).status(),
        StatusCode::BAD_REQUEST
    );
}
