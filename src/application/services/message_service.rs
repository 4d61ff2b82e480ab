use tracing::debug;

use crate::application::errors::BotError;
use crate::domain::entities::Message;
use crate::domain::traits::Client;
use crate::plugins::Registry;

/// Service for processing messages
///
/// Owns the client and the registry and runs one incoming line end to end:
/// preprocess, process, then send whatever the plugins answered.
pub struct MessageService<C: Client> {
    client: C,
    registry: Registry,
}

impl<C: Client> MessageService<C> {
    pub fn new(client: C, registry: Registry) -> Self {
        Self { client, registry }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Process an incoming message and send the response, if any
    pub async fn handle(&self, message: Message) -> Result<Option<String>, BotError> {
        // Never answer ourselves
        if message.nick == self.client.nickname() {
            return Ok(None);
        }

        debug!("[<--] {}", message);

        let message = self.registry.preprocess(&self.client, message);
        let responses = self.registry.process(&self.client, &message);
        if responses.is_empty() {
            return Ok(None);
        }

        let text = responses.join("\n");
        debug!("[-->] {} - {}", message.channel, text);
        self.client.send_message(&message.channel, &text).await?;
        Ok(Some(text))
    }
}
