//! Runtime settings from the environment (and `.env` when present).

use std::time::Duration;

/// Everything the web server needs to start. Unset or unparsable values fall back to defaults.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base of the registration backend, e.g. `http://localhost:5000/api`.
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Cookie signing key material; at least 64 bytes.
    pub session_secret: Option<String>,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    /// Directory of the compiled front end, served at `/`.
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let session_secret = get("SESSION_SECRET").filter(|s| {
            let long_enough = s.len() >= 64;
            if !long_enough {
                log::warn!("SESSION_SECRET is shorter than 64 bytes; ignoring it");
            }
            long_enough
        });

        Self {
            host: get("HOST").unwrap_or_else(default_host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            api_base_url: get("API_BASE_URL").unwrap_or_else(default_api_base_url),
            request_timeout: Duration::from_secs(
                get("REQUEST_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .filter(|&s| s > 0)
                    .unwrap_or_else(default_timeout_secs),
            ),
            session_secret,
            session_ttl_hours: get("SESSION_TTL_HOURS")
                .and_then(|h| h.parse().ok())
                .filter(|&h| h > 0)
                .unwrap_or_else(default_session_ttl_hours),
            cookie_secure: get("COOKIE_SECURE")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            static_dir: get("STATIC_DIR").unwrap_or_else(default_static_dir),
        }
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}
