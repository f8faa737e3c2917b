//! # linkcore
//!
//! A URL shortening service built with Axum, with PostgreSQL or in-memory storage.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Core entities and store traits
//! - **Application Layer** ([`application`]) - Allocation, resolution, lifecycle and auth
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL, in-memory stores and cache
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Random or sequential short codes, plus caller-chosen aliases
//! - Uniqueness enforced atomically by the store, safe under concurrent requests
//! - Rename and delete with permanent retirement of deleted codes
//! - Redis read-through cache for redirects
//! - API token authentication with per-token link ownership
//!
//! ## Quick Start
//!
//! ```bash
//! export TOKEN_SIGNING_SECRET="change-me"
//! export STORAGE_BACKEND=memory
//! export MEMORY_API_TOKEN="dev-token"
//!
//! cargo run
//!
//! curl -X POST localhost:3000/api/links \
//!   -H 'Authorization: Bearer dev-token' \
//!   -d '{"url": "https://example.com"}' -H 'Content-Type: application/json'
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AllocationService, AuthService, LifecycleService, Principal, ResolutionService,
    };
    pub use crate::domain::entities::{Link, NewLink};
    pub use crate::domain::repositories::{LinkRepository, StoreError, TokenRepository};
    pub use crate::error::AppError;
    pub use crate::state::{AppState, StateParts};
}
