//! Environment-driven settings.

use std::collections::HashMap;
use std::time::Duration;
use tournament_registration_web::config::AppConfig;

fn from(pairs: &[(&str, &str)]) -> AppConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let c = from(&[]);
    assert_eq!(c.bind_addr(), ("0.0.0.0", 8080));
    assert_eq!(c.api_base_url, "http://localhost:5000/api");
    assert_eq!(c.request_timeout, Duration::from_secs(10));
    assert_eq!(c.session_secret, None);
    assert_eq!(c.session_ttl_hours, 24);
    assert!(!c.cookie_secure);
    assert_eq!(c.static_dir, "static");
}

#[test]
fn values_are_read_and_bad_ones_ignored() {
    let secret = "k".repeat(64);
    let c = from(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "not-a-port"),
        ("API_BASE_URL", "https://api.example.com/api"),
        ("REQUEST_TIMEOUT_SECS", "3"),
        ("SESSION_SECRET", secret.as_str()),
        ("SESSION_TTL_HOURS", "-1"),
        ("COOKIE_SECURE", "true"),
    ]);
    assert_eq!(c.bind_addr(), ("127.0.0.1", 8080));
    assert_eq!(c.api_base_url, "https://api.example.com/api");
    assert_eq!(c.request_timeout, Duration::from_secs(3));
    assert_eq!(c.session_secret.as_deref(), Some(secret.as_str()));
    assert_eq!(c.session_ttl_hours, 24);
    assert!(c.cookie_secure);
}

#[test]
fn short_session_secret_is_dropped() {
    let c = from(&[("SESSION_SECRET", "too-short")]);
    assert_eq!(c.session_secret, None);
}
