//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::{
    AllocationService, AuthService, LifecycleService, ResolutionService,
};
use crate::domain::repositories::{LinkRepository, TokenRepository};
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;

/// Services and settings shared across requests.
///
/// Cheap to clone; everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub allocation_service: Arc<AllocationService>,
    pub resolution_service: Arc<ResolutionService>,
    pub lifecycle_service: Arc<LifecycleService>,
    pub auth_service: Arc<AuthService>,
    /// Kept for health checks.
    pub link_repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    /// Prefix of returned short URLs, without trailing slash.
    pub public_base_url: String,
}

/// Inputs for [`AppState::new`].
pub struct StateParts {
    pub link_repository: Arc<dyn LinkRepository>,
    pub token_repository: Arc<dyn TokenRepository>,
    pub cache: Arc<dyn CacheService>,
    pub generator: Arc<dyn CodeGenerator>,
    pub max_attempts: u32,
    pub signing_secret: String,
    pub public_base_url: String,
}

impl AppState {
    /// Wires the services over one store and one cache.
    pub fn new(parts: StateParts) -> Self {
        let StateParts {
            link_repository,
            token_repository,
            cache,
            generator,
            max_attempts,
            signing_secret,
            public_base_url,
        } = parts;

        Self {
            allocation_service: Arc::new(AllocationService::new(
                link_repository.clone(),
                generator,
                max_attempts,
            )),
            resolution_service: Arc::new(ResolutionService::new(
                link_repository.clone(),
                cache.clone(),
            )),
            lifecycle_service: Arc::new(LifecycleService::new(
                link_repository.clone(),
                cache.clone(),
            )),
            auth_service: Arc::new(AuthService::new(token_repository, signing_secret)),
            link_repository,
            cache,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}
