#![forbid(unsafe_code)]

//! Core domain model and business logic for Ovia.
//!
//! This crate provides:
//! - Calendar-day date utilities
//! - Cycle projection and phase classification
//! - Pregnancy anchor resolution and progress
//! - Per-user profile documents (file and in-memory stores)
//! - Request-level operations and calendar export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod dates;
pub mod projector;
pub mod phase;
pub mod pregnancy;
pub mod store;
pub mod service;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, EngineConfig};
pub use projector::project_cycles;
pub use phase::classify_phase;
pub use pregnancy::{pregnancy_progress, resolve_pregnancy};
pub use store::{FileProfileStore, MemoryProfileStore, ProfileStore, UserDocument};
