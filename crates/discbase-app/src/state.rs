use std::sync::Arc;

use discbase_dal::Pool;
use discbase_store::file_store::FileStore;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool, store: FileStore) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                pool,
                store,
                app_config,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn build_url(&self, relative_url: &str) -> Result<Url, url::ParseError> {
        let base = &self.config().base_url;
        base.join(relative_url)
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn store(&self) -> &FileStore {
        &self.state.store
    }
}

struct AppStateInner {
    pool: Pool,
    store: FileStore,
    app_config: AppConfig,
}

pub struct AppConfig {
    pub base_url: Url,
    pub upload_limit_mb: usize,
}
