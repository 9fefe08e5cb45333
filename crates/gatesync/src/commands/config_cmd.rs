//! Config subcommand handlers.

use gatesync_config::{self as shared, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "account_id = \"{}\"", p.account_id);
        let _ = writeln!(out, "auth_email = \"{}\"", p.auth_email);
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        let _ = writeln!(out, "bucket_url = \"{}\"", p.bucket_url);
        if let Some(ref env) = p.bucket_token_env {
            let _ = writeln!(out, "bucket_token_env = \"{env}\"");
        }
        let _ = writeln!(out, "devices_object = \"{}\"", p.devices_object);
        let _ = writeln!(out, "memberships_object = \"{}\"", p.memberships_object);
        let _ = writeln!(out, "groups = {:?}", p.groups);
        let _ = writeln!(out, "list_prefix = \"{}\"", p.list_prefix);
        let _ = writeln!(out, "store_artifacts = {}", p.store_artifacts);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

const CONFIG_TEMPLATE: &str = r#"default_profile = "default"

[defaults]
output = "table"
# color = "auto"
# timeout = 30

[profiles.default]
account_id = "your-account-id"
auth_email = "admin@example.com"
# api_url = "https://api.cloudflare.com"

# Credential chain: api_key_env, then the system keyring
# (gatesync config set-key), then plaintext api_key below.
api_key_env = "GATESYNC_API_KEY"
# api_key = ""

bucket_url = "https://storage.example.com/gatesync"
# bucket_token_env = "GATESYNC_BUCKET_TOKEN"

devices_object = "devices.json"
memberships_object = "memberships.json"
groups = ["engineering"]
list_prefix = "VIPs - "
store_artifacts = false
"#;

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to access keyring: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: write a commented template ────────────────────────
        ConfigCommand::Init => {
            let path = shared::config_path();
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("config already exists at {}", path.display()),
                });
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, CONFIG_TEMPLATE)?;

            eprintln!("✓ Configuration template written to {}", path.display());
            eprintln!("  Edit it, then test with: gatesync lists list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = shared::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = shared::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: gatesync config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = shared::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            shared::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { profile } => {
            let cfg = shared::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| active_profile_name(global, &cfg));

            let key = rpassword::prompt_password("API key: ").map_err(keyring_err)?;
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }

            let entry = keyring::Entry::new("gatesync", &format!("{profile_name}/api-key"))
                .map_err(keyring_err)?;
            entry.set_password(&key).map_err(keyring_err)?;

            eprintln!("✓ API key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
