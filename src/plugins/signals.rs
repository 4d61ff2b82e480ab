//! Lifecycle notifications

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Lifecycle events published by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// A load cycle over the plugin source finished
    PluginsLoaded,
    /// The client finished signing on
    Signon,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::PluginsLoaded => "plugins_loaded",
            Signal::Signon => "signon",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publish point the registry emits to
pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: Signal);
}

type SignalHandler = Box<dyn Fn(Signal) + Send + Sync>;

/// Process-wide signal hub with per-signal subscribers
#[derive(Default)]
pub struct Signals {
    handlers: RwLock<HashMap<Signal, Vec<SignalHandler>>>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `signal`
    pub fn on<F>(&self, signal: Signal, handler: F)
    where
        F: Fn(Signal) + Send + Sync + 'static,
    {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.entry(signal).or_default().push(Box::new(handler)),
            Err(_) => tracing::error!("Signal handlers lock poisoned, dropping subscription to {}", signal),
        }
    }
}

impl SignalSink for Signals {
    fn emit(&self, signal: Signal) {
        tracing::debug!(signal = %signal, "Emitting signal");

        let Ok(handlers) = self.handlers.read() else {
            tracing::error!("Signal handlers lock poisoned, {} not delivered", signal);
            return;
        };

        for handler in handlers.get(&signal).into_iter().flatten() {
            handler(signal);
        }
    }
}

impl fmt::Debug for Signals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self
            .handlers
            .read()
            .map(|h| h.values().map(Vec::len).sum())
            .unwrap_or(0);
        f.debug_struct("Signals").field("handlers", &count).finish()
    }
}
