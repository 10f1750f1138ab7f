use std::sync::Arc;

use crate::proxy::CacheProxy;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<CacheProxy>,
}
