//! Flag-aware profile resolution on top of `gatesync-config`.
//!
//! The shared crate owns the TOML schema and the env/keyring/plaintext
//! credential chain; this module layers CLI flag overrides on top and
//! produces the ready-to-run context handed to the commands.

use std::time::Duration;

use secrecy::SecretString;

use gatesync_api::{GatewayClient, ObjectStore, TlsMode};
use gatesync_config::{self as shared, Config, Settings};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a remote-bound command needs: resolved settings plus
/// credentials.
pub struct RunContext {
    pub profile_name: String,
    pub settings: Settings,
    pub api_key: SecretString,
    pub bucket_token: Option<SecretString>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the run context from the config file, profile, and CLI overrides.
pub fn resolve(global: &GlobalOpts) -> Result<RunContext, CliError> {
    let config = shared::load_config_or_default();
    let profile_name = active_profile_name(global, &config);

    let Some(profile) = config.profiles.get(&profile_name) else {
        return Err(CliError::NoConfig {
            path: shared::config_path().display().to_string(),
        });
    };

    let mut settings = shared::profile_to_settings(profile)?;

    // Flag overrides (flag > env > profile)
    if let Some(ref account) = global.account {
        settings.account_id.clone_from(account);
    }
    if global.insecure {
        settings.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    settings.transport.timeout = Duration::from_secs(global.timeout);

    let api_key = resolve_api_key(profile, &profile_name, global)?;
    let bucket_token = shared::resolve_bucket_token(profile);

    Ok(RunContext {
        profile_name,
        settings,
        api_key,
        bucket_token,
    })
}

/// Credential chain with the CLI flag in front of the shared chain.
fn resolve_api_key(
    profile: &shared::Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref key) = global.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Ok(shared::resolve_api_key(profile, profile_name)?)
}

/// Build the two boundary clients from a resolved context.
pub fn build_clients(ctx: &RunContext) -> Result<(GatewayClient, ObjectStore), CliError> {
    let gateway = GatewayClient::from_credentials(
        &ctx.settings.api_url,
        &ctx.settings.account_id,
        &ctx.settings.auth_email,
        &ctx.api_key,
        &ctx.settings.transport,
    )?;

    let store = ObjectStore::new(
        &ctx.settings.bucket_url,
        ctx.bucket_token.as_ref(),
        &ctx.settings.transport,
    )?;

    Ok((gateway, store))
}
