//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors a plugin reports back to the registry.
///
/// `NotReady` is not a fault: it is the cooperative signal that ends the
/// current dispatch round. Everything else is logged and swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("Response not ready")]
    NotReady,

    #[error("Plugin failed: {0}")]
    Failed(String),

    #[error("Plugin could not be resolved: {0}")]
    Resolve(String),
}

/// Result type returned by plugin calls
pub type PluginResult<T> = Result<T, PluginError>;

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid plugin: {0}")]
    InvalidPlugin(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Read error: {0}")]
    Read(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
