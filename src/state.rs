//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::email::Mailer;
use crate::services::upload::ImageStore;

/// Shared handles for every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenService,
    hasher: PasswordHasher,
    images: ImageStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        let tokens = TokenService::from_config(&config.security);
        let hasher = PasswordHasher::new(config.security.bcrypt_cost);
        let images = ImageStore::new(config.server.upload_dir.clone(), config.server.max_upload_bytes);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                mailer,
                tokens,
                hasher,
                images,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.inner.hasher
    }

    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}
