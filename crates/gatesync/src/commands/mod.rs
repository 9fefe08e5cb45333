//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod config_cmd;
pub mod lists;
pub mod serve;
pub mod sync;

use crate::cli::{Command, GlobalOpts};
use crate::config::RunContext;
use crate::error::CliError;

/// Dispatch a remote-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &RunContext, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Sync(args) => sync::handle(ctx, args, global).await,
        Command::Serve(args) => serve::handle(ctx, args).await,
        Command::Lists(args) => lists::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
