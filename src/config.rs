//! Server settings parsed from environment variables.

use std::time::Duration;

use crate::llm::config::LlmConfig;
use crate::llm::types::LlmError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;
const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    /// Output token cap for each completion request.
    pub max_tokens: u32,
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub cookie_secure: bool,
    pub llm: LlmConfig,
}

impl Settings {
    /// Read every setting from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM provider is unknown.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM provider is unknown.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let llm = LlmConfig::from_lookup(&lookup)?;
        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            max_tokens: parse_or(&lookup, "TROUBLESHOOT_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            session_idle_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_IDLE_TTL_SECS",
                DEFAULT_SESSION_IDLE_TTL_SECS,
            )),
            session_sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_SWEEP_INTERVAL_SECS",
                DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
            )),
            cookie_secure: lookup("COOKIE_SECURE")
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(false),
            llm,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
