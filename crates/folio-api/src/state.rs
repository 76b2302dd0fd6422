//! Application state wiring the engine to its infra adapters.
//!
//! The controller is generic over the lifecycle port and the cache medium;
//! `AppState` pins it to the SQLite store and the configured local cache.

use std::path::PathBuf;
use std::sync::Arc;

use folio_core::cache::CacheBridge;
use folio_core::draft::{DraftController, LoadOutcome, ResumeTarget, resume_target};
use folio_core::section::registry::SectionRegistry;
use folio_infra::cache::{LocalCacheStore, open_local_cache};
use folio_infra::config::load_config;
use folio_infra::filesystem::{cache_dir, ensure_dir, resolve_data_dir};
use folio_infra::registry::school_registry;
use folio_infra::sqlite::pool::DatabasePool;
use folio_infra::sqlite::report::SqliteReportStore;
use folio_types::config::FolioConfig;
use folio_types::draft::OwnerKey;

pub type ConcreteController = DraftController<SqliteReportStore, LocalCacheStore>;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: FolioConfig,
    pub db_pool: DatabasePool,
    pub registry: Arc<SectionRegistry>,
    pub owner: OwnerKey,
}

impl AppState {
    /// Resolve the data directory, load config and open the database.
    pub async fn init(owner: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_dir(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_pool = DatabasePool::open(&data_dir).await?;
        let registry = Arc::new(school_registry(&db_pool));

        Ok(Self {
            data_dir,
            config,
            db_pool,
            registry,
            owner: OwnerKey::new(owner.unwrap_or_else(default_owner)),
        })
    }

    fn cache(&self) -> CacheBridge<LocalCacheStore> {
        match open_local_cache(&self.config.cache, &cache_dir(&self.data_dir)) {
            Some(store) => CacheBridge::new(store),
            None => CacheBridge::disabled(),
        }
    }

    fn report_store(&self) -> SqliteReportStore {
        SqliteReportStore::new(self.db_pool.clone())
    }

    /// Start a sitting: build a controller and load the owner's draft.
    pub async fn open_draft(&self) -> anyhow::Result<(ConcreteController, LoadOutcome)> {
        let mut controller = DraftController::new(
            self.owner.clone(),
            Arc::clone(&self.registry),
            self.report_store(),
            self.cache(),
            self.config.autosave.clone(),
        );
        let outcome = controller.load().await?;
        Ok((controller, outcome))
    }

    /// Where the owner would resume, without loading section data.
    pub async fn resume_target(&self) -> anyhow::Result<ResumeTarget> {
        let target = resume_target(
            &self.report_store(),
            &self.cache(),
            &self.owner,
            self.registry.len(),
        )
        .await?;
        Ok(target)
    }
}

fn default_owner() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "default".to_string())
}
