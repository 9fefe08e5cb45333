//! One-shot reconciliation command.

use std::fmt::Write;

use serde::Serialize;

use gatesync_api::{GatewayClient, ObjectStore};
use gatesync_core::{
    Device, DiffPayload, DiffStrategy, FullReplace, GroupMembership, GroupOutcome, MinimalDiff,
    SyncEngine, SyncOptions, SyncReport, desired_entries,
};

use crate::cli::{GlobalOpts, StrategyArg, SyncArgs};
use crate::config::{self, RunContext};
use crate::error::CliError;
use crate::output;

fn strategy_of(arg: StrategyArg) -> Box<dyn DiffStrategy> {
    match arg {
        StrategyArg::FullReplace => Box::new(FullReplace),
        StrategyArg::Minimal => Box::new(MinimalDiff),
    }
}

// ── Report rendering ─────────────────────────────────────────────────

fn report_detail(report: &SyncReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run started: {}", report.started_at.to_rfc3339());

    for group in &report.groups {
        match &group.outcome {
            GroupOutcome::Synced => {
                let _ = writeln!(
                    out,
                    "  {}: +{} -{} (list {})",
                    group.group,
                    group.appended,
                    group.removed,
                    group.list_id.as_deref().unwrap_or("?")
                );
            }
            GroupOutcome::Skipped => {
                let _ = writeln!(out, "  {}: skipped (no matching list)", group.group);
            }
            GroupOutcome::Failed { message } => {
                let _ = writeln!(out, "  {}: FAILED: {message}", group.group);
            }
        }
    }

    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &RunContext, args: SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (gateway, store) = config::build_clients(ctx)?;

    let mut options = ctx.settings.sync.clone();
    if args.store {
        options.store_artifacts = true;
    }
    if args.no_store {
        options.store_artifacts = false;
    }

    if args.dry_run {
        return dry_run(&gateway, &store, &options, args.strategy, global).await;
    }

    let report = SyncEngine::new(&gateway, &store, &options)
        .with_strategy(strategy_of(args.strategy))
        .run()
        .await?;

    let out = output::render_single(&global.output, &report, report_detail, |r| {
        r.started_at.to_rfc3339()
    });
    output::print_output(&out, global.quiet);

    if report.has_failures() {
        let failed = report
            .groups
            .iter()
            .filter(|g| matches!(g.outcome, GroupOutcome::Failed { .. }))
            .count();
        return Err(CliError::PartialFailure {
            failed,
            total: report.groups.len(),
        });
    }

    Ok(())
}

// ── Dry run ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GroupPreview {
    group: String,
    list_id: Option<String>,
    payload: Option<DiffPayload>,
}

fn preview_detail(previews: &[GroupPreview]) -> String {
    let mut out = String::new();
    for p in previews {
        match (&p.list_id, &p.payload) {
            (Some(id), Some(payload)) => {
                let _ = writeln!(
                    out,
                    "  {}: would send +{} -{} to list {id}",
                    p.group,
                    payload.append.len(),
                    payload.remove.len()
                );
            }
            _ => {
                let _ = writeln!(out, "  {}: skipped (no matching list)", p.group);
            }
        }
    }
    format!("Dry run -- nothing written\n{}", out.trim_end())
}

/// Compute every group's payload and print it without writing anything,
/// remote or local.
async fn dry_run(
    gateway: &GatewayClient,
    store: &ObjectStore,
    options: &SyncOptions,
    strategy: StrategyArg,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let strategy = strategy_of(strategy);

    let devices: Vec<Device> = store.get_json(&options.devices_object).await?;
    let memberships: Vec<GroupMembership> = store.get_json(&options.memberships_object).await?;
    let lists = gateway.list_lists().await?;

    let mut previews = Vec::with_capacity(options.groups.len());
    for group in &options.groups {
        let list_name = format!("{}{group}", options.list_prefix);
        let Some(list) = lists.iter().find(|l| l.name == list_name) else {
            previews.push(GroupPreview {
                group: group.clone(),
                list_id: None,
                payload: None,
            });
            continue;
        };

        let current: Vec<String> = gateway
            .list_items(&list.id)
            .await?
            .into_iter()
            .map(|item| item.value)
            .collect();
        let desired = desired_entries(&devices, &memberships, group);

        previews.push(GroupPreview {
            group: group.clone(),
            list_id: Some(list.id.clone()),
            payload: Some(strategy.build(desired, current)),
        });
    }

    let out = output::render_single(&global.output, &previews, |p| preview_detail(p), |_| {
        "dry-run".into()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
