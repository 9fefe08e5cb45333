//! HTTP trigger surface and schedule loop.
//!
//! `GET /` and `POST /sync` both run one reconciliation pass and answer
//! with a JSON report. The optional schedule loop runs the identical
//! pass on a fixed interval, with artifact persistence forced on.
//! Triggers within one process serialize on a mutex around the engine,
//! so overlapping requests queue instead of racing remote writes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use gatesync_api::{GatewayClient, ObjectStore};
use gatesync_core::{CoreError, SyncEngine, SyncOptions, SyncReport};

/// Shared server state: the two boundary clients, run options, and the
/// lock that serializes runs.
pub struct AppState {
    gateway: GatewayClient,
    store: ObjectStore,
    options: SyncOptions,
    run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(gateway: GatewayClient, store: ObjectStore, options: SyncOptions) -> Self {
        Self {
            gateway,
            store,
            options,
            run_lock: Mutex::new(()),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the trigger router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(trigger))
        .route("/sync", post(trigger))
        .route("/favicon.ico", get(favicon))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Browsers ask for this on every visit; answer before doing any work.
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn trigger(State(state): State<SharedState>) -> (StatusCode, Json<serde_json::Value>) {
    match run_once(&state, false).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({ "message": "Gateway lists updated!", "report": report })),
        ),
        Err(err) if err.is_dataset_missing() => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found in storage bucket" })),
        ),
        Err(err) => {
            error!(error = %err, "triggered run failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

// ── Run execution ────────────────────────────────────────────────────

/// Run one pass under the state's run lock. Scheduled runs always
/// persist artifacts.
async fn run_once(state: &AppState, scheduled: bool) -> Result<SyncReport, CoreError> {
    let _guard = state.run_lock.lock().await;

    let mut options = state.options.clone();
    if scheduled {
        options.store_artifacts = true;
    }

    SyncEngine::new(&state.gateway, &state.store, &options)
        .run()
        .await
}

// ── Schedule loop ────────────────────────────────────────────────────

/// Spawn the interval loop. Cancelling the token stops it at the next
/// tick boundary.
pub fn spawn_schedule(
    state: SharedState,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately; the first reconciliation runs at startup.

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!("schedule loop stopped");
                    break;
                }

                _ = interval.tick() => {
                    match run_once(&state, true).await {
                        Ok(report) => info!(
                            synced = report.synced_count(),
                            skipped = report.skipped_count(),
                            failed = report.has_failures(),
                            "scheduled run complete"
                        ),
                        Err(err) => error!(error = %err, "scheduled run failed"),
                    }
                }
            }
        }
    })
}
