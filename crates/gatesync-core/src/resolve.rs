//! Membership resolution: the join between the device inventory and
//! the group roster.

use crate::model::{Device, GroupMembership, ListEntry};

/// Compute the desired entry set for one group.
///
/// Inner join on user email, filtered to memberships of `group`:
/// one entry per matching `(device, membership)` pair, in devices-outer
/// / memberships-inner order. Duplicate roster rows produce duplicate
/// entries — multiplicity is deliberately preserved.
///
/// Pure: depends only on the inputs, never on remote list state.
pub fn desired_entries(
    devices: &[Device],
    memberships: &[GroupMembership],
    group: &str,
) -> Vec<ListEntry> {
    let mut entries = Vec::new();

    for device in devices {
        for membership in memberships {
            if device.email == membership.email && membership.group == group {
                entries.push(ListEntry {
                    description: entry_description(device),
                    value: device.vip.clone(),
                });
            }
        }
    }

    entries
}

/// Informational metadata attached to each entry. Not part of the
/// diff key.
fn entry_description(device: &Device) -> String {
    format!(
        "USER:{}; DEVICE:{}; TYPE:{}",
        device.email, device.name, device.device_type
    )
}
