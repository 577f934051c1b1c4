use std::sync::Arc;

use tokio::sync::Mutex;

use shared_config::AppConfig;
use shared_database::Repositories;

/// Shared state handed to every router.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    /// Serializes the conflict check and insert of new sessions within this process.
    pub scheduling_guard: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories) -> Self {
        Self {
            config: Arc::new(config),
            repos,
            scheduling_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(config: AppConfig) -> Self {
        let repos = Repositories::from_config(&config);
        Self::new(config, repos)
    }
}
