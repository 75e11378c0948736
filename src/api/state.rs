use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::{self, Config},
    services::{Catalog, Recommender, VoteLedger},
    store::{JsonLedgerStore, LedgerStore},
};

/// Service context shared by every request handler.
///
/// Built once at startup; the catalog and similarity engine are read-only,
/// and the vote ledger serializes its own mutations.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub ledger: Arc<VoteLedger>,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Loads the catalog and vote ledger described by `config`
    pub async fn from_config(config: &Config) -> Self {
        let catalog = Catalog::load(config).await;
        let store: Arc<dyn LedgerStore> =
            Arc::new(JsonLedgerStore::new(config.data_file(config::VOTES_FILE)));
        Self::new(config, catalog, store).await
    }

    /// Assembles state from an already loaded catalog and a ledger store
    pub async fn new(config: &Config, catalog: Catalog, store: Arc<dyn LedgerStore>) -> Self {
        let recommender = Recommender::new(
            catalog,
            config.recommend_top_k,
            config.recommend_min_score,
        );
        let ledger = VoteLedger::open(store).await;

        Self {
            recommender: Arc::new(recommender),
            ledger: Arc::new(ledger),
            static_dir: config.static_dir.clone(),
        }
    }
}
