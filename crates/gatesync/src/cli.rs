//! Clap derive structures for the `gatesync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gatesync -- reconcile gateway allow-lists from device and group datasets
#[derive(Debug, Parser)]
#[command(
    name = "gatesync",
    version,
    about = "Reconcile gateway allow-lists from device and group datasets",
    long_about = "Joins a device inventory against a group-membership roster and\n\
        keeps the matching gateway allow-lists up to date, one PATCH per group.\n\
        Runs on demand, behind an HTTP trigger, or on a fixed schedule.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "GATESYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway account id (overrides profile)
    #[arg(long, env = "GATESYNC_ACCOUNT_ID", global = true)]
    pub account: Option<String>,

    /// Gateway API key
    #[arg(long, env = "GATESYNC_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GATESYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GATESYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GATESYNC_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass now
    Sync(SyncArgs),

    /// Run the HTTP trigger surface, optionally with a schedule
    Serve(ServeArgs),

    /// Inspect the remote gateway lists
    #[command(alias = "ls")]
    Lists(ListsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sync ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Persist diff payloads to the object store
    #[arg(long, overrides_with = "no_store")]
    pub store: bool,

    /// Skip artifact persistence even if the profile enables it
    #[arg(long, overrides_with = "store")]
    pub no_store: bool,

    /// Diff strategy
    #[arg(long, default_value = "full-replace")]
    pub strategy: StrategyArg,

    /// Compute and print the payloads without patching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Remove every current value and re-append the whole desired set
    FullReplace,
    /// Send only the values that actually change
    Minimal,
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address for the HTTP trigger surface
    #[arg(long, default_value = "127.0.0.1:8787")]
    pub listen: SocketAddr,

    /// Also run on a fixed schedule (e.g. "15m", "1h")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub every: Option<Duration>,
}

// ── Lists ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListsArgs {
    #[command(subcommand)]
    pub command: ListsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListsCommand {
    /// List the gateway lists defined for the account
    List,

    /// Show the current entries of one list
    Items {
        /// List id
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the active configuration (secrets masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store an API key in the system keyring
    SetKey {
        /// Profile to store the key for (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Write a commented configuration template
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
