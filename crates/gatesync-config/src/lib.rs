//! Shared configuration for the gatesync CLI and server.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation into the engine's [`Settings`]. The CLI adds
//! flag-aware overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatesync_api::{TlsMode, TransportConfig};
use gatesync_core::SyncOptions;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named account profile: one gateway account plus one dataset bucket.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway account id.
    pub account_id: String,

    /// Email paired with the API key for gateway auth.
    pub auth_email: String,

    /// Gateway API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (plaintext — prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Object store base URL holding the input datasets.
    pub bucket_url: String,

    /// Environment variable name containing the bucket bearer token.
    pub bucket_token_env: Option<String>,

    /// Object key of the device inventory dataset.
    #[serde(default = "default_devices_object")]
    pub devices_object: String,

    /// Object key of the group-membership roster dataset.
    #[serde(default = "default_memberships_object")]
    pub memberships_object: String,

    /// Groups whose lists this profile reconciles.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Prefix for list matching and artifact naming.
    #[serde(default = "default_list_prefix")]
    pub list_prefix: String,

    /// Persist diff payloads to the bucket on every run.
    #[serde(default)]
    pub store_artifacts: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

fn default_api_url() -> String {
    "https://api.cloudflare.com".into()
}
fn default_devices_object() -> String {
    "devices.json".into()
}
fn default_memberships_object() -> String {
    "memberships.json".into()
}
fn default_list_prefix() -> String {
    "VIPs - ".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "gatesync", "gatesync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gatesync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("GATESYNC_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the gateway API key from the credential chain (no CLI flag
/// step): profile env var, then system keyring, then plaintext config.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("gatesync", &format!("{profile_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the optional bucket bearer token. A profile without a token
/// env var targets an unauthenticated store endpoint.
pub fn resolve_bucket_token(profile: &Profile) -> Option<SecretString> {
    profile
        .bucket_token_env
        .as_ref()
        .and_then(|env_name| std::env::var(env_name).ok())
        .map(SecretString::from)
}

// ── Settings assembly ───────────────────────────────────────────────

/// Everything a run needs, resolved from one profile. The API key is
/// resolved separately so callers can layer flag overrides first.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub account_id: String,
    pub auth_email: String,
    pub bucket_url: String,
    pub transport: TransportConfig,
    pub sync: SyncOptions,
}

/// Build run [`Settings`] from a profile — no CLI flag overrides.
pub fn profile_to_settings(profile: &Profile) -> Result<Settings, ConfigError> {
    let _: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;
    let _: url::Url = profile
        .bucket_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "bucket_url".into(),
            reason: format!("invalid URL: {}", profile.bucket_url),
        })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(default_timeout())),
    };

    Ok(Settings {
        api_url: profile.api_url.clone(),
        account_id: profile.account_id.clone(),
        auth_email: profile.auth_email.clone(),
        bucket_url: profile.bucket_url.clone(),
        transport,
        sync: SyncOptions {
            devices_object: profile.devices_object.clone(),
            memberships_object: profile.memberships_object.clone(),
            groups: profile.groups.clone(),
            list_prefix: profile.list_prefix.clone(),
            store_artifacts: profile.store_artifacts,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            account_id: "acct1".into(),
            auth_email: "admin@example.com".into(),
            api_url: default_api_url(),
            api_key: Some("plaintext-key".into()),
            api_key_env: None,
            bucket_url: "https://store.example.com/bucket".into(),
            bucket_token_env: None,
            devices_object: default_devices_object(),
            memberships_object: default_memberships_object(),
            groups: vec!["eng".into()],
            list_prefix: default_list_prefix(),
            store_artifacts: false,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn settings_carry_profile_sync_options() {
        let settings = profile_to_settings(&profile()).expect("profile should convert");
        assert_eq!(settings.sync.groups, ["eng"]);
        assert_eq!(settings.sync.devices_object, "devices.json");
        assert_eq!(settings.sync.list_prefix, "VIPs - ");
        assert!(!settings.sync.store_artifacts);
        assert_eq!(settings.transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_bucket_url_is_rejected() {
        let mut p = profile();
        p.bucket_url = "not a url".into();
        let err = profile_to_settings(&p).expect_err("should reject");
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "bucket_url"));
    }

    #[test]
    fn insecure_overrides_ca_cert() {
        let mut p = profile();
        p.insecure = Some(true);
        p.ca_cert = Some(PathBuf::from("/tmp/ca.pem"));
        let settings = profile_to_settings(&p).expect("profile should convert");
        assert!(matches!(settings.transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn config_default_has_default_profile() {
        let cfg = Config::default();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
    }
}
