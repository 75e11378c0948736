pub mod json;

use std::collections::BTreeMap;

use crate::error::AppResult;

pub use json::{load_collection, JsonLedgerStore};

/// Vote counts keyed by the string form of a book id
pub type VoteCounts = BTreeMap<String, u64>;

/// Backing store for the vote ledger
///
/// The ledger is always read and written as a whole; there is no partial
/// update path.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Reads the persisted ledger, yielding an empty mapping when nothing usable is stored
    async fn load(&self) -> VoteCounts;

    /// Replaces the persisted ledger with `counts`
    async fn persist(&self, counts: &VoteCounts) -> AppResult<()>;
}
