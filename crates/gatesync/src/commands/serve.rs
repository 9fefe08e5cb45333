//! Serve command: HTTP trigger surface plus optional schedule loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::ServeArgs;
use crate::config::{self, RunContext};
use crate::error::CliError;
use crate::server::{self, AppState};

pub async fn handle(ctx: &RunContext, args: ServeArgs) -> Result<(), CliError> {
    let (gateway, store) = config::build_clients(ctx)?;
    let state = Arc::new(AppState::new(gateway, store, ctx.settings.sync.clone()));

    let cancel = CancellationToken::new();
    let schedule = args.every.map(|every| {
        info!(every = ?every, "schedule loop enabled");
        server::spawn_schedule(Arc::clone(&state), every, cancel.child_token())
    });

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!(addr = %args.listen, profile = %ctx.profile_name, "listening");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(handle) = schedule {
        let _ = handle.await;
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
