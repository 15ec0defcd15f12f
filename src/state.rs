// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{config::Config, services::ranking::RankingStrategy};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub ranking: Arc<dyn RankingStrategy>,
}

impl AppState {
    /// Builds the state, picking the ranking strategy named in the config.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let ranking = config.ranking.strategy();
        Self {
            pool,
            config,
            ranking,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn RankingStrategy> {
    fn from_ref(state: &AppState) -> Self {
        state.ranking.clone()
    }
}
