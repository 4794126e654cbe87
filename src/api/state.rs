//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, PresenceRegistry};
use crate::services::{Collaborators, ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// All application services
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache; rate limiting and certificate caching are skipped without it
    pub cache: Option<Arc<Cache>>,
    /// Database handle used by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from live connections and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: Config,
        collaborators: Collaborators,
    ) -> Self {
        let services = Services::from_connection(
            database.get_connection(),
            config,
            PresenceRegistry::new(),
            collaborators,
        );

        Self {
            services: Arc::new(services),
            cache: Some(cache),
            database: Some(database),
        }
    }

    /// State over an arbitrary service container, without Redis or a database.
    pub fn with_services(services: Arc<dyn ServiceContainer>) -> Self {
        Self {
            services,
            cache: None,
            database: None,
        }
    }
}
