use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::PrettyFormatter;

use super::{LedgerStore, VoteCounts};
use crate::error::AppResult;

/// Loads a JSON array dataset.
///
/// A missing or malformed file degrades to an empty collection so the service
/// can still start.
pub async fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_json::<Vec<T>>(path).await {
        Some(items) => {
            tracing::info!(path = %path.display(), count = items.len(), "Dataset loaded");
            items
        }
        None => Vec::new(),
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Dataset unavailable, using empty default");
            return None;
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Dataset malformed, using empty default");
            None
        }
    }
}

/// Serializes `value` with four-space indentation, leaving non-ASCII text unescaped
fn to_indented_json<T: Serialize>(value: &T) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Vote ledger persisted as a single JSON object, rewritten in full on every change
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next ledger is written to before it replaces `path`
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("votes.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl LedgerStore for JsonLedgerStore {
    async fn load(&self) -> VoteCounts {
        read_json(&self.path).await.unwrap_or_default()
    }

    async fn persist(&self, counts: &VoteCounts) -> AppResult<()> {
        let body = to_indented_json(counts)?;

        // The previous ledger stays in place until the new one is fully written.
        let staging = self.staging_path();
        if let Err(e) = tokio::fs::write(&staging, body).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::debug!(path = %self.path.display(), entries = counts.len(), "Vote ledger written");
        Ok(())
    }
}
