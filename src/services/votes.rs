use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    store::{LedgerStore, VoteCounts},
};

/// Outcome of a recorded vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub book_id: String,
    pub new_vote_count: u64,
}

/// Normalizes a client-supplied book id into its ledger key.
///
/// Integers and non-empty strings are accepted; anything else is a client error.
pub fn normalize_book_id(raw: Option<&Value>) -> AppResult<String> {
    match raw {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Null) | None => Err(AppError::InvalidInput("book_id is required".to_string())),
        Some(Value::String(_)) => Err(AppError::InvalidInput("book_id must not be empty".to_string())),
        Some(other) => Err(AppError::InvalidInput(format!(
            "book_id must be a number or string, got {}",
            other
        ))),
    }
}

/// Per-book vote counter backed by a [`LedgerStore`].
///
/// Each vote holds the ledger lock across increment and persist, so concurrent
/// votes are applied one at a time and none are lost. A vote whose write fails
/// is rolled back before the error is returned.
pub struct VoteLedger {
    counts: Mutex<VoteCounts>,
    store: Arc<dyn LedgerStore>,
}

impl VoteLedger {
    /// Builds a ledger seeded with whatever the store currently holds
    pub async fn open(store: Arc<dyn LedgerStore>) -> Self {
        let counts = store.load().await;
        tracing::info!(entries = counts.len(), "Vote ledger loaded");
        Self {
            counts: Mutex::new(counts),
            store,
        }
    }

    /// Increments the count for `book_id` and persists the whole ledger.
    ///
    /// Ids absent from the book catalog are still counted.
    pub async fn record_vote(&self, book_id: &str) -> AppResult<VoteReceipt> {
        let mut counts = self.counts.lock().await;

        let previous = counts.get(book_id).copied();
        let new_vote_count = previous.unwrap_or(0) + 1;
        counts.insert(book_id.to_string(), new_vote_count);

        if let Err(e) = self.store.persist(&counts).await {
            match previous {
                Some(count) => counts.insert(book_id.to_string(), count),
                None => counts.remove(book_id),
            };
            tracing::error!(book_id = %book_id, error = %e, "Failed to persist vote, rolled back");
            return Err(e);
        }

        tracing::info!(book_id = %book_id, new_vote_count, "Vote recorded");

        Ok(VoteReceipt {
            book_id: book_id.to_string(),
            new_vote_count,
        })
    }

    /// Current count for `book_id`, zero when it has never been voted for
    pub async fn count_for(&self, book_id: &str) -> u64 {
        self.counts.lock().await.get(book_id).copied().unwrap_or(0)
    }

    /// Copy of every count, for read paths that need many lookups
    pub async fn snapshot(&self) -> VoteCounts {
        self.counts.lock().await.clone()
    }
}
