//! Plugin registry - catalog of named plugins and the dispatch pipelines
//!
//! The registry owns every registered plugin, tracks which plugin names are
//! enabled per channel, and runs the two dispatch chains:
//!
//! - `preprocess`: each enabled plugin may rewrite the message, in priority
//!   order, feeding its result to the next one.
//! - `process`: each enabled plugin may respond, in priority order.
//!
//! One registry is built at startup and passed by reference to whatever drives
//! the message loop. Calls are expected from a single thread of control.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::errors::{PluginError, RegistryError};
use crate::application::messaging::{Addressing, CommandParser};
use crate::domain::entities::Message;
use crate::domain::traits::Client;
use super::signals::{Signal, SignalSink};
use super::source::PluginSource;
use super::trait_def::{Context, Plugin, PluginEntry};

/// Resolved settings the registry runs with
#[derive(Debug, Clone, Default)]
pub struct RegistrySettings {
    pub addressing: Addressing,
    /// Only keep the responses of the first plugin that answers
    pub first_responder_only: bool,
    /// When set, only these plugins are loaded from the source
    pub allow: Option<Vec<String>>,
    /// Plugins never loaded from the source
    pub deny: Vec<String>,
    /// Plugins enabled on a channel when the bot joins it
    pub default_channel: Vec<String>,
}

/// Outcome of reloading a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reload {
    Reloaded,
    Failed(String),
    UnknownPlugin(String),
}

impl Reload {
    pub fn is_success(&self) -> bool {
        matches!(self, Reload::Reloaded)
    }
}

impl fmt::Display for Reload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reload::Reloaded => f.write_str("Reloaded"),
            Reload::Failed(reason) => write!(f, "Reload failed: {}", reason),
            Reload::UnknownPlugin(message) => f.write_str(message),
        }
    }
}

/// Registry for plugins and per-channel enablement
pub struct Registry {
    plugins: HashMap<String, PluginEntry>,
    enabled_plugins: HashMap<String, BTreeSet<String>>,
    parser: CommandParser,
    settings: RegistrySettings,
    source: Box<dyn PluginSource>,
    signals: Arc<dyn SignalSink>,
}

impl Registry {
    pub fn new(settings: RegistrySettings, source: Box<dyn PluginSource>, signals: Arc<dyn SignalSink>) -> Self {
        Self {
            plugins: HashMap::new(),
            enabled_plugins: HashMap::new(),
            parser: CommandParser::new(settings.addressing.clone()),
            settings,
            source,
            signals,
        }
    }

    /// Register a plugin under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, entry: impl Into<PluginEntry>) -> Result<(), RegistryError> {
        let name = name.into();
        let entry = entry.into();
        entry.validate()?;

        info!(plugin = %name, count = entry.plugins().len(), "Registering plugin");
        self.plugins.insert(name, entry);
        Ok(())
    }

    /// Get a plugin by name
    pub fn get_plugin(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins.get(name)
    }

    /// Names of all registered plugins
    pub fn all_plugins(&self) -> BTreeSet<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Enable plugin names on a channel. Names need not be registered yet.
    pub fn enable<I, S>(&mut self, channel: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let enabled = self.enabled_plugins.entry(channel.to_string()).or_default();
        for name in names {
            enabled.insert(name.into());
        }
    }

    /// Disable plugin names on a channel
    pub fn disable<I, S>(&mut self, channel: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(enabled) = self.enabled_plugins.get_mut(channel) {
            for name in names {
                enabled.remove(name.as_ref());
            }
        }
    }

    /// Enable the configured default plugins on a channel
    pub fn enable_defaults(&mut self, channel: &str) {
        let defaults = self.settings.default_channel.clone();
        debug!(channel = %channel, plugins = ?defaults, "Enabling default plugins");
        self.enable(channel, defaults);
    }

    /// Plugin names enabled on a channel
    pub fn enabled<'a>(&'a self, channel: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.enabled_plugins
            .get(channel)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn is_enabled(&self, channel: &str, name: &str) -> bool {
        self.enabled_plugins
            .get(channel)
            .map(|enabled| enabled.contains(name))
            .unwrap_or(false)
    }

    /// Help lines of the plugins enabled on a channel, in name order
    pub fn help(&self, channel: &str) -> Vec<String> {
        self.enabled(channel)
            .filter_map(|name| self.plugins.get(name))
            .flat_map(|entry| entry.plugins().iter().filter_map(|plugin| plugin.help()))
            .collect()
    }

    /// Enabled plugins of a channel sorted by priority
    ///
    /// Decorated entries expand to all their plugins. Enabled names with no
    /// registered plugin are skipped. Equal priorities keep expansion order.
    pub fn prioritized(&self, channel: &str, high_to_low: bool) -> Vec<Arc<dyn Plugin>> {
        self.prioritized_named(channel, high_to_low)
            .into_iter()
            .map(|(_, plugin)| plugin)
            .collect()
    }

    fn prioritized_named(&self, channel: &str, high_to_low: bool) -> Vec<(&str, Arc<dyn Plugin>)> {
        let mut items: Vec<(&str, Arc<dyn Plugin>)> = self
            .enabled(channel)
            .filter_map(|name| self.plugins.get_key_value(name))
            .flat_map(|(name, entry)| {
                entry
                    .plugins()
                    .iter()
                    .map(move |plugin| (name.as_str(), Arc::clone(plugin)))
            })
            .collect();

        if high_to_low {
            items.sort_by_key(|(_, plugin)| Reverse(plugin.priority()));
        } else {
            items.sort_by_key(|(_, plugin)| plugin.priority());
        }
        items
    }

    /// Run a message through every enabled plugin and collect responses
    pub fn process(&self, client: &dyn Client, message: &Message) -> Vec<String> {
        let ctx = Context::new(client, &self.parser);
        let mut responses: Vec<Vec<String>> = Vec::new();

        for (name, plugin) in self.prioritized_named(&message.channel, true) {
            let response = match plugin.process(&ctx, message) {
                Ok(response) => response,
                Err(PluginError::NotReady) => {
                    debug!(plugin = %name, channel = %message.channel, "Response not ready, ending round");
                    break;
                }
                Err(e) => {
                    error!(plugin = %name, channel = %message.channel, error = %e, "Plugin failed to process message");
                    continue;
                }
            };

            let lines = response.into_lines();
            if !lines.is_empty() {
                debug!(plugin = %name, count = lines.len(), "Plugin responded");
                responses.push(lines);
            }
        }

        if self.settings.first_responder_only {
            responses.into_iter().next().unwrap_or_default()
        } else {
            responses.into_iter().flatten().collect()
        }
    }

    /// Let every enabled plugin rewrite the message, in priority order
    pub fn preprocess(&self, client: &dyn Client, message: Message) -> Message {
        let ctx = Context::new(client, &self.parser);
        let plugins = self.prioritized_named(&message.channel, true);
        let mut current = message;

        for (name, plugin) in plugins {
            match plugin.preprocess(&ctx, current.clone()) {
                Ok(rewritten) => current = rewritten,
                Err(e) => {
                    error!(plugin = %name, channel = %current.channel, error = %e, "Plugin failed to preprocess message");
                }
            }
        }

        current
    }

    fn is_allowed(&self, name: &str) -> bool {
        let allowed = self
            .settings
            .allow
            .as_ref()
            .map(|allow| allow.iter().any(|a| a == name))
            .unwrap_or(true);
        allowed && !self.settings.deny.iter().any(|d| d == name)
    }

    /// Load every plugin the source offers, skipping the ones that fail
    pub fn load(&mut self) -> usize {
        let mut loaded = 0;

        for entry in self.source.entries() {
            if !self.is_allowed(&entry.name) {
                debug!(plugin = %entry.name, "Plugin not allowed, skipping");
                continue;
            }

            let resolved = match entry.resolve() {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!(plugin = %entry.name, module = %entry.module, error = %e, "Failed to load plugin");
                    continue;
                }
            };

            match self.register(entry.name.clone(), resolved) {
                Ok(()) => loaded += 1,
                Err(e) => warn!(plugin = %entry.name, error = %e, "Failed to register plugin"),
            }
        }

        info!(count = loaded, "Plugins loaded");
        self.signals.emit(Signal::PluginsLoaded);
        loaded
    }

    /// Resolve a registered plugin again and swap it in
    ///
    /// On any failure the previous registration stays in place.
    pub fn reload(&mut self, name: &str) -> Reload {
        if !self.plugins.contains_key(name) {
            return Reload::UnknownPlugin(format!("Unknown plugin '{}'. Is it installed?", name));
        }

        let Some(module) = self.source.locate(name) else {
            warn!(plugin = %name, "No source for plugin, cannot reload");
            return Reload::Failed(format!("no source for plugin '{}'", name));
        };

        let entry = match self.source.refresh(name) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(plugin = %name, module = %module, error = %e, "Failed to reload plugin");
                return Reload::Failed(e.to_string());
            }
        };

        match self.register(name, entry) {
            Ok(()) => {
                info!(plugin = %name, module = %module, "Reloaded plugin");
                Reload::Reloaded
            }
            Err(e) => {
                warn!(plugin = %name, error = %e, "Reloaded plugin is invalid");
                Reload::Failed(e.to_string())
            }
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.all_plugins())
            .field("enabled_plugins", &self.enabled_plugins)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
