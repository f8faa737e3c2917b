//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Link`] - A live short code to destination mapping
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! [`NewLink`] carries what the caller decides, while the store assigns `id` and
//! `created_at`.

pub mod link;

pub use link::{Link, NewLink};
