//! Shared handler state.

use std::sync::Arc;

use sixten_core::{
    Analyzer, ContentFetcher, EventBus, FavoriteTagRepository, LinkRepository, OwnerId,
    TagRepository, TriageLimits,
};
use sixten_db::{
    Database, MemoryStore, PgFavoriteTagRepository, PgLinkRepository, PgTagRepository,
};

use crate::services::TriageService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<dyn LinkRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub favorites: Arc<dyn FavoriteTagRepository>,
    pub fetcher: Arc<dyn ContentFetcher>,
    pub analyzer: Arc<dyn Analyzer>,
    /// Event bus for real-time notifications (SSE).
    pub event_bus: EventBus,
    pub triage: TriageService,
    /// Owner every request is scoped to.
    pub owner: OwnerId,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        links: Arc<dyn LinkRepository>,
        tags: Arc<dyn TagRepository>,
        favorites: Arc<dyn FavoriteTagRepository>,
        fetcher: Arc<dyn ContentFetcher>,
        analyzer: Arc<dyn Analyzer>,
        event_bus: EventBus,
        limits: TriageLimits,
        owner: OwnerId,
    ) -> Self {
        let triage = TriageService::new(
            links.clone(),
            tags.clone(),
            favorites.clone(),
            fetcher.clone(),
            analyzer.clone(),
            event_bus.clone(),
            limits,
        );
        Self {
            links,
            tags,
            favorites,
            fetcher,
            analyzer,
            event_bus,
            triage,
            owner,
        }
    }

    /// State backed by PostgreSQL repositories.
    pub fn with_database(
        db: &Database,
        fetcher: Arc<dyn ContentFetcher>,
        analyzer: Arc<dyn Analyzer>,
        limits: TriageLimits,
        owner: OwnerId,
    ) -> Self {
        Self::new(
            Arc::new(PgLinkRepository::new(db.pool.clone())),
            Arc::new(PgTagRepository::new(db.pool.clone())),
            Arc::new(PgFavoriteTagRepository::new(db.pool.clone())),
            fetcher,
            analyzer,
            EventBus::default(),
            limits,
            owner,
        )
    }

    /// State backed by one shared in-memory store.
    pub fn with_memory_store(
        store: MemoryStore,
        fetcher: Arc<dyn ContentFetcher>,
        analyzer: Arc<dyn Analyzer>,
        limits: TriageLimits,
        owner: OwnerId,
    ) -> Self {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            fetcher,
            analyzer,
            EventBus::default(),
            limits,
            owner,
        )
    }
}
