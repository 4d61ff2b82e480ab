//! Domain layer - Core types with no external dependencies
//!
//! This layer contains:
//! - Entities: Message and Response
//! - Traits: Abstractions for infrastructure (Client)

pub mod entities;
pub mod traits;
