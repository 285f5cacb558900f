//! Client configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! The same client code runs against a local dev server (API proxied under
//! `/api` on the app origin) and against a deployed API host. An explicit
//! `IDEAHUB_API_BASE` always wins; otherwise the base address is the
//! same-origin `/api` prefix, and that origin must be a permitted host.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const SAME_ORIGIN_API_PREFIX: &str = "/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const BUILTIN_ALLOWED_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];
const TOKEN_FILE_NAME: &str = "token";
const APP_DIR_NAME: &str = "ideahub";

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base address `{0}`: expected an absolute http(s) URL")]
    InvalidBaseAddress(String),

    #[error("host `{host}` is not in the allowed hosts list")]
    HostNotAllowed { host: String },
}

/// Transport defaults handed to the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL prefix for every relative API path, without a trailing slash.
    pub api_base: String,
    /// True when `api_base` came from an explicit override.
    pub api_base_overridden: bool,
    pub origin: String,
    pub allowed_hosts: Vec<String>,
    pub token_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from process environment variables.
    ///
    /// Optional:
    /// - `IDEAHUB_API_BASE`: explicit API base address
    /// - `IDEAHUB_ORIGIN`: app origin used with `/api` (default `http://localhost:5173`)
    /// - `IDEAHUB_ALLOWED_HOSTS`: comma-separated extra permitted hosts
    /// - `IDEAHUB_DEPLOY_HOST`: one extra permitted host
    /// - `IDEAHUB_TOKEN_FILE`: token file path
    /// - `IDEAHUB_REQUEST_TIMEOUT_SECS`: default 30
    /// - `IDEAHUB_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resolved base address is invalid or
    /// its host is not permitted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_api_base(None)
    }

    /// Same as [`ClientConfig::from_env`], with `api_base` (when set) taking
    /// the place of `IDEAHUB_API_BASE` before the base address is resolved.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_env_with_api_base(api_base: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_lookup(override_api_base(api_base, |key| std::env::var(key).ok()))
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let origin = var("IDEAHUB_ORIGIN")
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let allowed_hosts = parse_allowed_hosts(
            var("IDEAHUB_ALLOWED_HOSTS").as_deref(),
            var("IDEAHUB_DEPLOY_HOST").as_deref(),
        );
        let explicit = var("IDEAHUB_API_BASE");
        let api_base = resolve_base_address(explicit.as_deref(), &origin, &allowed_hosts)?;
        let token_file = var("IDEAHUB_TOKEN_FILE").map_or_else(default_token_file, PathBuf::from);
        let timeouts = Timeouts {
            request_secs: parse_u64(var("IDEAHUB_REQUEST_TIMEOUT_SECS").as_deref(), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(var("IDEAHUB_CONNECT_TIMEOUT_SECS").as_deref(), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_base, api_base_overridden: explicit.is_some(), origin, allowed_hosts, token_file, timeouts })
    }

    /// Replace the base address with an explicit override. The origin check
    /// has already run by now; use [`ClientConfig::from_env_with_api_base`]
    /// when the override must bypass it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseAddress`] for non-http(s) input.
    pub fn with_api_base(mut self, explicit: &str) -> Result<Self, ConfigError> {
        self.api_base = resolve_base_address(Some(explicit), &self.origin, &self.allowed_hosts)?;
        self.api_base_overridden = true;
        Ok(self)
    }

    #[must_use]
    pub fn with_token_file(mut self, path: PathBuf) -> Self {
        self.token_file = path;
        self
    }
}

/// Pick the API base address: explicit override first, else `<origin>/api`.
///
/// # Errors
///
/// Returns [`ConfigError`] for unparsable addresses, or when the derived
/// same-origin address points at a host that is not permitted.
pub fn resolve_base_address(
    explicit: Option<&str>,
    origin: &str,
    allowed_hosts: &[String],
) -> Result<String, ConfigError> {
    if let Some(explicit) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return normalize_base_address(explicit);
    }

    let url = validate_http_url(origin)?;
    let host = url.host_str().unwrap_or_default();
    if !allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return Err(ConfigError::HostNotAllowed { host: host.to_owned() });
    }
    Ok(format!("{}{SAME_ORIGIN_API_PREFIX}", origin.trim_end_matches('/')))
}

/// Validate an absolute http(s) base address and strip trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseAddress`] for anything else.
pub fn normalize_base_address(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    validate_http_url(raw)?;
    Ok(raw.trim_end_matches('/').to_owned())
}

/// Built-in hosts plus any extras, deduplicated in first-seen order.
#[must_use]
pub fn parse_allowed_hosts(extra: Option<&str>, deploy_host: Option<&str>) -> Vec<String> {
    let mut hosts: Vec<String> = BUILTIN_ALLOWED_HOSTS.iter().map(|h| (*h).to_owned()).collect();
    let extras = extra
        .into_iter()
        .flat_map(|raw| raw.split(','))
        .chain(deploy_host)
        .map(str::trim)
        .filter(|h| !h.is_empty());
    for host in extras {
        if !hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
            hosts.push(host.to_owned());
        }
    }
    hosts
}

/// Wrap `lookup` so a non-blank `api_base` answers for `IDEAHUB_API_BASE`.
fn override_api_base<'a>(
    api_base: Option<&'a str>,
    lookup: impl Fn(&str) -> Option<String> + 'a,
) -> impl Fn(&str) -> Option<String> + 'a {
    let api_base = api_base.map(str::trim).filter(|s| !s.is_empty());
    move |key| match api_base {
        Some(base) if key == "IDEAHUB_API_BASE" => Some(base.to_owned()),
        _ => lookup(key),
    }
}

fn validate_http_url(raw: &str) -> Result<reqwest::Url, ConfigError> {
    let url = reqwest::Url::parse(raw).map_err(|_| ConfigError::InvalidBaseAddress(raw.to_owned()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseAddress(raw.to_owned()));
    }
    Ok(url)
}

fn parse_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
}

fn default_token_file() -> PathBuf {
    dirs::data_dir()
        .map_or_else(|| PathBuf::from(".ideahub"), |dir| dir.join(APP_DIR_NAME))
        .join(TOKEN_FILE_NAME)
}
