//! In-process store implementations.
//!
//! Selected with `STORAGE_BACKEND=memory`. State is lost on restart.

mod memory_link_repository;
mod memory_token_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use memory_token_repository::MemoryTokenRepository;
