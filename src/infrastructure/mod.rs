//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Client implementations (console)

pub mod adapters;
pub mod config;
