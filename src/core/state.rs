use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::session_manager::SessionPolicy;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    policy: SessionPolicy,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        let policy = SessionPolicy::from_settings(settings.session());
        Self { inner: Arc::new(InnerState { settings, db, policy }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn policy(&self) -> &SessionPolicy {
        &self.inner.policy
    }

    pub(crate) fn batch_size(&self) -> u32 {
        self.inner.settings.session().question_batch_size
    }
}
