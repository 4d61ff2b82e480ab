//! Application layer - Use cases
//!
//! This layer contains:
//! - Errors: Error types shared across the crate
//! - Messaging: Command parsing
//! - Services: Message handling orchestration

pub mod errors;
pub mod messaging;
pub mod services;
