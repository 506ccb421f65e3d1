// src/state.rs
// Shared application state handed to every handler

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    auth::store::UserStore,
    community::store::CommunityStore,
    competition::store::CompetitionStore,
    config::EcoConfig,
    event::store::EventStore,
    report::store::ReportStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EcoConfig>,
    pub pool: SqlitePool,

    // -------- Storage --------
    pub user_store: UserStore,
    pub competition_store: CompetitionStore,
    pub event_store: EventStore,
    pub report_store: ReportStore,
    pub community_store: CommunityStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: EcoConfig) -> Self {
        Self {
            config: Arc::new(config),
            user_store: UserStore::new(pool.clone()),
            competition_store: CompetitionStore::new(pool.clone()),
            event_store: EventStore::new(pool.clone()),
            report_store: ReportStore::new(pool.clone()),
            community_store: CommunityStore::new(pool.clone()),
            pool,
        }
    }
}

pub type SharedState = Arc<AppState>;
