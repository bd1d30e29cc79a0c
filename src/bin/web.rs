//! Single binary web server: JSON endpoints for registration and the admin dashboard,
//! backed by the registration REST API. The compiled front end is served from STATIC_DIR.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, API_BASE_URL, etc.
//! (see `AppConfig`).

use actix_files::Files;
use actix_web::{
    cookie::{time, Key},
    web::Data,
    App, HttpServer,
};
use tournament_registration_web::{
    api::{http_client, ApiClient, Session},
    config::AppConfig,
    server::{routes, session_middleware, AppState},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let http = http_client(config.request_timeout).map_err(std::io::Error::other)?;
    // Reject a bad API_BASE_URL at startup rather than on the first request.
    ApiClient::new(http.clone(), &config.api_base_url, Session::ephemeral())
        .map_err(std::io::Error::other)?;

    let key = match &config.session_secret {
        Some(secret) => Key::from(secret.as_bytes()),
        None => {
            log::warn!("SESSION_SECRET not set; generated a key, sessions end on restart");
            Key::generate()
        }
    };

    let (host, port) = config.bind_addr();
    let bind = (host.to_string(), port);
    log::info!(
        "Starting server at http://{}:{} (backend {})",
        bind.0,
        bind.1,
        config.api_base_url
    );

    let static_dir = config.static_dir.clone();
    let serve_static = std::path::Path::new(&static_dir).is_dir();
    if !serve_static {
        log::info!("static dir {static_dir:?} not found; serving the JSON API only");
    }
    let ttl = time::Duration::hours(config.session_ttl_hours);
    let cookie_secure = config.cookie_secure;
    let state = Data::new(AppState::new(config, http));

    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(session_middleware(key.clone(), cookie_secure, ttl))
            .configure(routes);
        if serve_static {
            app.service(Files::new("/", static_dir.as_str()).index_file("index.html"))
        } else {
            app
        }
    })
    .bind(bind)?
    .run()
    .await
}
