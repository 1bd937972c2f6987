use std::collections::HashMap;

use super::*;

fn settings_from(pairs: &[(&str, &str)]) -> Settings {
    let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
    Settings::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap()
}

#[test]
fn defaults() {
    let s = settings_from(&[]);
    assert_eq!(s.bind_addr, "0.0.0.0");
    assert_eq!(s.port, 3000);
    assert_eq!(s.max_tokens, 1024);
    assert_eq!(s.session_idle_ttl, Duration::from_secs(3600));
    assert_eq!(s.session_sweep_interval, Duration::from_secs(60));
    assert!(!s.cookie_secure);
    assert!(s.llm.api_key.is_none());
}

#[test]
fn overrides() {
    let s = settings_from(&[
        ("PORT", "8080"),
        ("BIND_ADDR", "127.0.0.1"),
        ("TROUBLESHOOT_MAX_TOKENS", "2048"),
        ("SESSION_IDLE_TTL_SECS", "30"),
        ("SESSION_SWEEP_INTERVAL_SECS", "5"),
        ("COOKIE_SECURE", "yes"),
    ]);
    assert_eq!(s.port, 8080);
    assert_eq!(s.bind_addr, "127.0.0.1");
    assert_eq!(s.max_tokens, 2048);
    assert_eq!(s.session_idle_ttl, Duration::from_secs(30));
    assert_eq!(s.session_sweep_interval, Duration::from_secs(5));
    assert!(s.cookie_secure);
}

#[test]
fn invalid_numbers_fall_back() {
    let s = settings_from(&[("PORT", "eighty"), ("TROUBLESHOOT_MAX_TOKENS", "-1")]);
    assert_eq!(s.port, 3000);
    assert_eq!(s.max_tokens, 1024);
}

#[test]
fn unknown_provider_is_fatal() {
    let vars: HashMap<&str, &str> = [("LLM_PROVIDER", "cohere")].into_iter().collect();
    assert!(Settings::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).is_err());
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On", "  true  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "NO"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}
