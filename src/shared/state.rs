use std::sync::Arc;
use crate::system::config::AppConfig;
use crate::system::versioning::VersionRegistry;

/// Global shared state containing system-level dependencies.
/// Built once at startup; handlers only read from it.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<AppConfig>,
    pub version_registry: Arc<VersionRegistry>,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let version_registry = Arc::new(VersionRegistry::from_config(&config.versioning));
        Self {
            config: Arc::new(config),
            version_registry,
        }
    }
}
