//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::UsersService;
use crate::infrastructure::cache::CacheService;

/// Handles built once at startup and cloned into every request.
///
/// `cache` is the same store the service writes to; handlers use it directly
/// only for health probing.
#[derive(Clone)]
pub struct AppState {
    pub users_service: Arc<UsersService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(users_service: Arc<UsersService>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            users_service,
            cache,
        }
    }
}
