//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::MappingStore;

/// Handle shared by all request handlers.
///
/// The store is owned here rather than living in a global, so tests can
/// build isolated instances.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn MappingStore>>,
}

impl AppState {
    pub fn new(link_service: LinkService<dyn MappingStore>) -> Self {
        Self {
            link_service: Arc::new(link_service),
        }
    }
}
