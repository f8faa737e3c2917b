//! Domain layer containing business entities and store contracts.
//!
//! This module is independent of infrastructure and presentation concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Mapping store and token store trait definitions
//!
//! # Design Principles
//!
//! - The mapping store is the single source of truth and the only place where
//!   short code uniqueness is enforced
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Business rules live in services (see [`crate::application::services`])

pub mod entities;
pub mod repositories;
