//! Async HTTP clients for the two remote collaborators of gatesync:
//! the gateway list API and the dataset object store.
//!
//! This crate is transport-only: it knows wire shapes and auth, never
//! reconciliation semantics. `gatesync-core` builds the join/diff/sync
//! logic on top of it.

pub mod error;
pub mod gateway;
pub mod store;
pub mod transport;

pub use error::Error;
pub use gateway::{GatewayClient, GatewayList, ListItem};
pub use store::ObjectStore;
pub use transport::{TlsMode, TransportConfig};
