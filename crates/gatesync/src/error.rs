//! CLI error types with miette diagnostics.
//!
//! Maps API and engine errors into user-facing errors with actionable
//! help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use gatesync_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    #![allow(dead_code)]

    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach {endpoint}")]
    #[diagnostic(
        code(gatesync::connection_failed),
        help(
            "Check that the endpoint is reachable from this host.\n\
             Endpoint: {endpoint}"
        )
    )]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(gatesync::auth_failed),
        help(
            "The gateway API rejected the credentials.\n\
             Verify auth_email and the API key.\n\
             Run: gatesync config set-key --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(gatesync::no_credentials),
        help(
            "Store one with: gatesync config set-key\n\
             Or set the GATESYNC_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Datasets & resources ─────────────────────────────────────────

    #[error("Input dataset '{object}' not found in storage bucket")]
    #[diagnostic(
        code(gatesync::dataset_missing),
        help(
            "Upload the dataset to the bucket, or check devices_object /\n\
             memberships_object in the active profile."
        )
    )]
    DatasetMissing { object: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(gatesync::not_found),
        help("Run: gatesync {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Partial failure ──────────────────────────────────────────────

    #[error("{failed} of {total} groups failed to reconcile")]
    #[diagnostic(
        code(gatesync::partial_failure),
        help("Re-run with -v for per-group detail; successful groups were already updated.")
    )]
    PartialFailure { failed: usize, total: usize },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(gatesync::api_error))]
    ApiError {
        status: u16,
        message: String,
        code: Option<i64>,
    },

    #[error("Unexpected response body: {message}")]
    #[diagnostic(code(gatesync::bad_response))]
    BadResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gatesync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(gatesync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: gatesync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(gatesync::no_config),
        help(
            "Create one with: gatesync config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(gatesync::config))]
    Config(Box<gatesync_config::ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(gatesync::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DatasetMissing { .. } | Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Error mappings ───────────────────────────────────────────────────

impl From<gatesync_api::Error> for CliError {
    fn from(err: gatesync_api::Error) -> Self {
        match err {
            gatesync_api::Error::Authentication { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            gatesync_api::Error::Transport(e) => CliError::ConnectionFailed {
                endpoint: e
                    .url()
                    .map_or_else(|| "(request)".into(), ToString::to_string),
                source: e.into(),
            },

            gatesync_api::Error::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            gatesync_api::Error::Tls(message) => CliError::ConnectionFailed {
                endpoint: "(tls)".into(),
                source: message.into(),
            },

            gatesync_api::Error::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                status,
                message,
                code,
            },

            gatesync_api::Error::ObjectNotFound { key } => {
                CliError::DatasetMissing { object: key }
            }

            gatesync_api::Error::Deserialization { message, body: _ } => {
                CliError::BadResponse { message }
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DatasetMissing { object } => CliError::DatasetMissing { object },
            CoreError::Api(api) => api.into(),
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<gatesync_config::ConfigError> for CliError {
    fn from(err: gatesync_config::ConfigError) -> Self {
        match err {
            gatesync_config::ConfigError::Validation { field, reason } => {
                CliError::Validation { field, reason }
            }
            gatesync_config::ConfigError::NoCredentials { profile } => {
                CliError::NoCredentials { profile }
            }
            gatesync_config::ConfigError::ProfileNotFound(name) => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}
