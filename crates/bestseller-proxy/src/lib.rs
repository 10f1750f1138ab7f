//! Bestseller Proxy - caching proxy for the NYT Books bestseller lists API
//!
//! Serves the most recent persisted upstream payload while it is inside the
//! freshness window and refreshes from upstream on expiry, shielding the
//! slow, quota-limited API from per-request traffic.

pub mod config;
pub mod error;
pub mod nyt;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use nyt::{BestsellerSource, NytClient};
pub use proxy::CacheProxy;
pub use state::AppState;
pub use store::{PgSnapshotStore, Snapshot, SnapshotStore, StoreError};
