pub mod billing;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use config::SchoolSettings;
use services::api_client::BackendClient;
use std::sync::Arc;

/// Shared application state: the backend client and school settings.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub school: Arc<SchoolSettings>,
}

impl AppState {
    pub fn new(backend: Arc<BackendClient>, school: SchoolSettings) -> Self {
        Self {
            backend,
            school: Arc::new(school),
        }
    }
}
