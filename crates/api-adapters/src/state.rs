use std::sync::Arc;

use services::Services;

use crate::metrics::Metrics;

/// Shared by every handler; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
