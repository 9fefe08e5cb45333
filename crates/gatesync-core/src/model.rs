//! Value types for one reconciliation run.
//!
//! Everything here is recomputed fresh on every run; nothing persists
//! in memory across runs. The serde names follow the input dataset
//! documents and the gateway PATCH wire body.

use serde::{Deserialize, Serialize};

/// One device from the inventory dataset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    /// Owning user, the join key against [`GroupMembership`].
    pub email: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    /// Virtual IP — the value written to the gateway list.
    pub vip: String,
}

/// One row of the group-membership roster. A user in several groups
/// appears once per group.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupMembership {
    pub email: String,
    pub group: String,
}

/// One entry destined for a gateway list.
///
/// `value` is the diff key; `description` is informational metadata
/// and never participates in diffing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListEntry {
    pub description: String,
    pub value: String,
}

/// The combined append/remove instruction sent to the gateway API,
/// and the artifact optionally persisted to the object store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiffPayload {
    /// Values to delete from the list.
    pub remove: Vec<String>,
    /// Entries to add to the list.
    pub append: Vec<ListEntry>,
}

impl DiffPayload {
    /// True when the payload would not change the list at all.
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.append.is_empty()
    }
}
