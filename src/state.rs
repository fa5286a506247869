use crate::config::AppConfig;
use crate::users::repo::{SequentialIds, UserRepo};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserRepo,
}

impl AppState {
    pub fn new(config: AppConfig, users: UserRepo) -> Self {
        Self {
            config: Arc::new(config),
            users,
        }
    }

    /// Default config and an empty store with deterministic ids.
    pub fn fake() -> Self {
        Self::new(AppConfig::default(), UserRepo::with_ids(SequentialIds::new()))
    }
}
