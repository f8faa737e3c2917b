//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating store calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::AllocationService`] - Short link creation and code selection
//! - [`services::ResolutionService`] - Cached redirect lookups
//! - [`services::LifecycleService`] - Rename, delete and listing
//! - [`services::AuthService`] - API token authentication

pub mod services;
