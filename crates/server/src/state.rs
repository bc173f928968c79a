use std::sync::Arc;

use db::DBService;
use services::services::{
    completion::CompletionProcessor, dashboard::DashboardService, projector::ProjectorConfig,
    store::UserDataStore, usage::UsageLogger,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub store: Arc<UserDataStore>,
    pub completion: Arc<CompletionProcessor>,
    pub dashboard: Arc<DashboardService>,
    pub usage: Arc<UsageLogger>,
    pub projector: ProjectorConfig,
}

impl AppState {
    pub fn new(db: DBService, usage_log_path: impl Into<std::path::PathBuf>) -> Self {
        let store = Arc::new(UserDataStore::new(db.clone()));
        let completion = Arc::new(CompletionProcessor::new(db.clone(), store.clone()));
        let dashboard = Arc::new(DashboardService::new(db.clone()));
        let usage = Arc::new(UsageLogger::new(usage_log_path.into()));
        Self {
            db,
            store,
            completion,
            dashboard,
            usage,
            projector: ProjectorConfig::default(),
        }
    }
}
