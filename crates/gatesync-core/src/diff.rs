//! Diff construction: desired entries vs. current list contents.
//!
//! The strategy seam exists so the orchestrator never hard-codes the
//! replace policy: [`FullReplace`] reproduces the observed behavior of
//! the deployed tool, [`MinimalDiff`] is the set-difference variant.

use std::collections::HashSet;

use crate::model::{DiffPayload, ListEntry};

/// Turns a desired entry set and the list's current values into one
/// append/remove payload.
pub trait DiffStrategy: Send + Sync {
    fn build(&self, desired: Vec<ListEntry>, current: Vec<String>) -> DiffPayload;

    /// Strategy name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Full-replace policy: clear every current value, re-append the whole
/// desired set. Not a minimal diff — the remove set always equals the
/// list's current contents, whatever the overlap with `desired`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullReplace;

impl DiffStrategy for FullReplace {
    fn build(&self, desired: Vec<ListEntry>, current: Vec<String>) -> DiffPayload {
        DiffPayload {
            remove: current,
            append: desired,
        }
    }

    fn name(&self) -> &'static str {
        "full-replace"
    }
}

/// Minimal-diff policy: remove only values no longer desired, append
/// only entries whose value is not already on the list. Comparison is
/// by `value` only; descriptions never participate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalDiff;

impl DiffStrategy for MinimalDiff {
    fn build(&self, desired: Vec<ListEntry>, current: Vec<String>) -> DiffPayload {
        let desired_values: HashSet<&str> = desired.iter().map(|e| e.value.as_str()).collect();
        let current_values: HashSet<&str> = current.iter().map(String::as_str).collect();

        let remove = current
            .iter()
            .filter(|v| !desired_values.contains(v.as_str()))
            .cloned()
            .collect();

        let append = desired
            .into_iter()
            .filter(|e| !current_values.contains(e.value.as_str()))
            .collect();

        DiffPayload { remove, append }
    }

    fn name(&self) -> &'static str {
        "minimal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: &str) -> ListEntry {
        ListEntry {
            description: format!("USER:u@x.com; DEVICE:d; TYPE:t ({value})"),
            value: value.into(),
        }
    }

    // ── FullReplace ─────────────────────────────────────────────────

    #[test]
    fn full_replace_removes_everything_current() {
        let desired = vec![entry("10.0.0.3")];
        let current = vec!["10.0.0.1".to_owned(), "10.0.0.2".to_owned()];

        let payload = FullReplace.build(desired.clone(), current);

        assert_eq!(payload.append, desired);
        assert_eq!(payload.remove, ["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn full_replace_removes_even_overlapping_values() {
        // A value both current and desired is removed and re-appended.
        let desired = vec![entry("10.0.0.1")];
        let current = vec!["10.0.0.1".to_owned()];

        let payload = FullReplace.build(desired, current);

        assert_eq!(payload.remove, ["10.0.0.1"]);
        assert_eq!(payload.append.len(), 1);
    }

    #[test]
    fn full_replace_empty_current_removes_nothing() {
        let payload = FullReplace.build(vec![entry("10.0.0.1")], Vec::new());
        assert!(payload.remove.is_empty());
        assert_eq!(payload.append.len(), 1);
    }

    #[test]
    fn full_replace_preserves_desired_verbatim() {
        // Duplicates in the desired set pass through untouched.
        let desired = vec![entry("10.0.0.1"), entry("10.0.0.1")];
        let payload = FullReplace.build(desired.clone(), Vec::new());
        assert_eq!(payload.append, desired);
    }

    // ── MinimalDiff ─────────────────────────────────────────────────

    #[test]
    fn minimal_skips_values_already_present() {
        let desired = vec![entry("10.0.0.1"), entry("10.0.0.2")];
        let current = vec!["10.0.0.1".to_owned(), "10.0.0.9".to_owned()];

        let payload = MinimalDiff.build(desired, current);

        assert_eq!(payload.remove, ["10.0.0.9"]);
        let appended: Vec<&str> = payload.append.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(appended, ["10.0.0.2"]);
    }

    #[test]
    fn minimal_converged_list_is_a_noop() {
        let desired = vec![entry("10.0.0.1")];
        let current = vec!["10.0.0.1".to_owned()];

        let payload = MinimalDiff.build(desired, current);
        assert!(payload.is_empty());
    }

    #[test]
    fn strategy_names() {
        assert_eq!(FullReplace.name(), "full-replace");
        assert_eq!(MinimalDiff.name(), "minimal");
    }
}
