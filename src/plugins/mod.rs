//! Plugin system
//!
//! Plugins are named units of message handling. They come in three flavours
//! (commands, matches and preprocessors) or implement `Plugin` directly, and
//! are kept by the `Registry`, which decides which ones run for a channel
//! and in what order.

pub mod command;
pub mod decorate;
pub mod matcher;
pub mod preprocessor;
pub mod registry;
pub mod signals;
pub mod source;
pub mod trait_def;

pub use command::Command;
pub use decorate::Decorated;
pub use matcher::{IntoMatches, Match, Matches, Pattern};
pub use preprocessor::Preprocessor;
pub use registry::{Registry, RegistrySettings, Reload};
pub use signals::{Signal, SignalSink, Signals};
pub use source::{CatalogSource, PluginSource, SourceEntry};
pub use trait_def::{Context, Plugin, PluginEntry, PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_NORMAL};
