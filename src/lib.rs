//! Plugin registry and command dispatch for a chat bot
//!
//! Incoming lines become `Message`s that run through the registry's
//! preprocess chain and then its process chain; each enabled plugin, in
//! priority order, may rewrite the message or answer it.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;

#[cfg(test)]
pub(crate) mod testing;

pub use application::errors::{BotError, PluginError, PluginResult, RegistryError};
pub use domain::entities::{Message, Response};
pub use domain::traits::Client;
