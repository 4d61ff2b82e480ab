//! Plugin trait definitions

use std::fmt;
use std::sync::Arc;

use crate::application::errors::{PluginResult, RegistryError};
use crate::application::messaging::CommandParser;
use crate::domain::entities::{Message, Response};
use crate::domain::traits::Client;

pub const PRIORITY_LOW: i32 = 25;
pub const PRIORITY_NORMAL: i32 = 50;
pub const PRIORITY_HIGH: i32 = 75;

/// Everything a plugin sees besides the message itself
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub client: &'a dyn Client,
    pub parser: &'a CommandParser,
}

impl<'a> Context<'a> {
    pub fn new(client: &'a dyn Client, parser: &'a CommandParser) -> Self {
        Self { client, parser }
    }

    /// Nickname of the bot, used for nickname addressing
    pub fn nickname(&self) -> &str {
        self.client.nickname()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("nickname", &self.client.nickname())
            .field("addressing", self.parser.addressing())
            .finish()
    }
}

/// Core plugin trait that all plugins must implement
///
/// Every method has a default, so a plugin only overrides what it needs:
/// a responder overrides `process`, a rewriter overrides `preprocess`.
pub trait Plugin: Send + Sync {
    /// Dispatch order key, higher runs first
    fn priority(&self) -> i32 {
        0
    }

    /// Handle a message, optionally producing a response
    fn process(&self, _ctx: &Context<'_>, _message: &Message) -> PluginResult<Response> {
        Ok(Response::Empty)
    }

    /// Rewrite a message before it is processed
    fn preprocess(&self, _ctx: &Context<'_>, message: Message) -> PluginResult<Message> {
        Ok(message)
    }

    /// One line of usage help, if the plugin has any
    fn help(&self) -> Option<String> {
        None
    }
}

/// What the registry stores under a plugin name
#[derive(Clone)]
pub enum PluginEntry {
    /// A single plugin instance
    Single(Arc<dyn Plugin>),
    /// A decorated function carrying one synthesized plugin per decoration
    Decorated(Vec<Arc<dyn Plugin>>),
}

impl PluginEntry {
    pub fn instance<P: Plugin + 'static>(plugin: P) -> Self {
        PluginEntry::Single(Arc::new(plugin))
    }

    /// Build a fresh instance of a plugin type
    pub fn instantiate<P: Plugin + Default + 'static>() -> Self {
        PluginEntry::Single(Arc::new(P::default()))
    }

    /// All plugins behind this entry, in registration order
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        match self {
            PluginEntry::Single(plugin) => std::slice::from_ref(plugin),
            PluginEntry::Decorated(plugins) => plugins,
        }
    }

    pub fn is_decorated(&self) -> bool {
        matches!(self, PluginEntry::Decorated(_))
    }

    /// A decorated entry without any decoration is a plain function
    pub fn validate(&self) -> Result<(), RegistryError> {
        match self {
            PluginEntry::Decorated(plugins) if plugins.is_empty() => Err(RegistryError::InvalidPlugin(
                "function carries no plugin decorations".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginEntry::Single(plugin) => write!(f, "Single(priority={})", plugin.priority()),
            PluginEntry::Decorated(plugins) => write!(f, "Decorated({} plugins)", plugins.len()),
        }
    }
}

impl From<Arc<dyn Plugin>> for PluginEntry {
    fn from(plugin: Arc<dyn Plugin>) -> Self {
        PluginEntry::Single(plugin)
    }
}
