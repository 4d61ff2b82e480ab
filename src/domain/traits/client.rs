use async_trait::async_trait;
use crate::application::errors::BotError;

/// Client trait - abstraction for the chat connection
///
/// The registry only passes `&dyn Client` through to plugins. Sending is
/// done by the message service, never by dispatch itself.
#[async_trait]
pub trait Client: Send + Sync {
    /// Current nickname of the bot on this connection
    fn nickname(&self) -> &str;

    /// Send a message to a channel or nick
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError>;
}
