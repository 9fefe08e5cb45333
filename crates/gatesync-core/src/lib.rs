// gatesync-core: the reconciliation engine between the input datasets
// and the remote gateway lists.

pub mod diff;
pub mod error;
pub mod model;
pub mod resolve;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use diff::{DiffStrategy, FullReplace, MinimalDiff};
pub use error::CoreError;
pub use model::{Device, DiffPayload, GroupMembership, ListEntry};
pub use resolve::desired_entries;
pub use sync::{GroupOutcome, GroupReport, SyncEngine, SyncOptions, SyncReport};
