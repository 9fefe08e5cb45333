// ── Sync orchestrator ──
//
// Drives one full reconciliation pass: dataset load, one directory
// fetch, then a sequential per-group loop of match → read → resolve →
// diff → (persist) → patch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use gatesync_api::{GatewayClient, GatewayList, ObjectStore};

use crate::diff::{DiffStrategy, FullReplace};
use crate::error::CoreError;
use crate::model::{Device, GroupMembership};
use crate::resolve::desired_entries;

// ── Options ──────────────────────────────────────────────────────────

/// Run configuration, built once at startup and passed by reference —
/// the engine never reads ambient process state.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Object key of the device inventory dataset.
    pub devices_object: String,
    /// Object key of the group-membership roster dataset.
    pub memberships_object: String,
    /// Groups to reconcile, in order.
    pub groups: Vec<String>,
    /// Prefix prepended to a group name to find its gateway list, and
    /// to name its persisted artifact.
    pub list_prefix: String,
    /// Persist each group's payload to the object store before
    /// patching.
    pub store_artifacts: bool,
}

// ── Report ───────────────────────────────────────────────────────────

/// Terminal state of one group's reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOutcome {
    /// Payload submitted to the gateway API.
    Synced,
    /// No gateway list named `prefix + group`; nothing written.
    Skipped,
    /// The group's remote interaction failed; later groups still ran.
    Failed { message: String },
}

/// Per-group result within a [`SyncReport`].
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    pub appended: usize,
    pub removed: usize,
    pub outcome: GroupOutcome,
}

/// Aggregate result of one reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub groups: Vec<GroupReport>,
}

impl SyncReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            groups: Vec::new(),
        }
    }

    /// True if any group's reconciliation failed.
    pub fn has_failures(&self) -> bool {
        self.groups
            .iter()
            .any(|g| matches!(g.outcome, GroupOutcome::Failed { .. }))
    }

    /// Number of groups whose payload was submitted.
    pub fn synced_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.outcome == GroupOutcome::Synced)
            .count()
    }

    /// Number of groups skipped for lack of a matching list.
    pub fn skipped_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.outcome == GroupOutcome::Skipped)
            .count()
    }
}

// ── Engine ───────────────────────────────────────────────────────────

/// One-shot reconciliation engine.
///
/// Borrows its collaborators; construct per run. The diff strategy
/// defaults to [`FullReplace`] and is swappable without touching the
/// orchestration below.
pub struct SyncEngine<'a> {
    gateway: &'a GatewayClient,
    store: &'a ObjectStore,
    options: &'a SyncOptions,
    strategy: Box<dyn DiffStrategy>,
}

impl<'a> SyncEngine<'a> {
    pub fn new(gateway: &'a GatewayClient, store: &'a ObjectStore, options: &'a SyncOptions) -> Self {
        Self {
            gateway,
            store,
            options,
            strategy: Box::new(FullReplace),
        }
    }

    /// Replace the diff strategy.
    pub fn with_strategy(mut self, strategy: Box<dyn DiffStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run one full reconciliation pass across all configured groups.
    ///
    /// Aborts before any gateway work if either input dataset is
    /// missing. Inside the per-group loop, failures are recorded in
    /// the report and the remaining groups still run.
    pub async fn run(&self) -> Result<SyncReport, CoreError> {
        let devices: Vec<Device> = self
            .store
            .get_json(&self.options.devices_object)
            .await
            .map_err(map_dataset_error)?;

        let memberships: Vec<GroupMembership> = self
            .store
            .get_json(&self.options.memberships_object)
            .await
            .map_err(map_dataset_error)?;

        debug!(
            devices = devices.len(),
            memberships = memberships.len(),
            "input datasets loaded"
        );

        let lists = self.gateway.list_lists().await?;

        let mut report = SyncReport::new();
        for group in &self.options.groups {
            report
                .groups
                .push(self.sync_group(group, &devices, &memberships, &lists).await);
        }

        info!(
            strategy = self.strategy.name(),
            synced = report.synced_count(),
            skipped = report.skipped_count(),
            failed = report.groups.len() - report.synced_count() - report.skipped_count(),
            "reconciliation pass complete"
        );

        Ok(report)
    }

    /// Reconcile a single group as an isolated unit of work.
    async fn sync_group(
        &self,
        group: &str,
        devices: &[Device],
        memberships: &[GroupMembership],
        lists: &[GatewayList],
    ) -> GroupReport {
        let list_name = format!("{}{group}", self.options.list_prefix);

        let Some(list) = lists.iter().find(|l| l.name == list_name) else {
            warn!(group, list = %list_name, "no matching gateway list; skipping group");
            return GroupReport {
                group: group.to_owned(),
                list_id: None,
                appended: 0,
                removed: 0,
                outcome: GroupOutcome::Skipped,
            };
        };

        match self
            .reconcile_list(group, &list.id, &list_name, devices, memberships)
            .await
        {
            Ok((appended, removed)) => {
                info!(group, list_id = %list.id, appended, removed, "gateway list updated");
                GroupReport {
                    group: group.to_owned(),
                    list_id: Some(list.id.clone()),
                    appended,
                    removed,
                    outcome: GroupOutcome::Synced,
                }
            }
            Err(e) => {
                warn!(group, list_id = %list.id, error = %e, "group reconciliation failed");
                GroupReport {
                    group: group.to_owned(),
                    list_id: Some(list.id.clone()),
                    appended: 0,
                    removed: 0,
                    outcome: GroupOutcome::Failed {
                        message: e.to_string(),
                    },
                }
            }
        }
    }

    /// The read → resolve → diff → (persist) → patch sequence for one
    /// matched list. Item retrieval always precedes diff computation
    /// and submission.
    async fn reconcile_list(
        &self,
        group: &str,
        list_id: &str,
        list_name: &str,
        devices: &[Device],
        memberships: &[GroupMembership],
    ) -> Result<(usize, usize), gatesync_api::Error> {
        let current = self.gateway.list_items(list_id).await?;
        let current_values: Vec<String> = current.into_iter().map(|item| item.value).collect();

        let desired = desired_entries(devices, memberships, group);
        let payload = self.strategy.build(desired, current_values);
        let (appended, removed) = (payload.append.len(), payload.remove.len());

        if self.options.store_artifacts {
            self.store
                .put_json(&format!("{list_name}.json"), &payload)
                .await?;
        }

        self.gateway.update_list(list_id, &payload).await?;

        Ok((appended, removed))
    }
}

/// Dataset-load failures: a missing object aborts the run with a
/// caller-distinguishable error; anything else is a plain API error.
fn map_dataset_error(err: gatesync_api::Error) -> CoreError {
    match err {
        gatesync_api::Error::ObjectNotFound { key } => CoreError::DatasetMissing { object: key },
        other => CoreError::Api(other),
    }
}
