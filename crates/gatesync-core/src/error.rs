use thiserror::Error;

/// Run-level errors surfaced by the sync engine.
///
/// Per-group failures are not errors at this level: they are recorded
/// in the [`SyncReport`](crate::sync::SyncReport) and the run
/// continues. Only failures that precede the per-group loop (dataset
/// load, directory fetch) abort a run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required input dataset is absent from the object store.
    #[error("input dataset '{object}' not found in storage bucket")]
    DatasetMissing { object: String },

    /// A remote API call outside the per-group loop failed.
    #[error(transparent)]
    Api(#[from] gatesync_api::Error),

    /// Invalid run configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the run aborted because an input dataset was
    /// missing (mapped to a 404 on the HTTP trigger surface).
    pub fn is_dataset_missing(&self) -> bool {
        matches!(self, Self::DatasetMissing { .. })
    }
}
