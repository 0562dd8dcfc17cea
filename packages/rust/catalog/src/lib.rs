//! Catalog store and filter engine.
//!
//! Holds the current snapshot of articles for a view, replaces it wholesale on
//! refresh, and answers local substring filters without touching the network.

pub mod filter;
pub mod snapshot;
pub mod store;

pub use filter::{MatchField, SearchQuery};
pub use snapshot::{RefreshPolicy, Snapshot, SnapshotOrigin};
pub use store::Catalog;
