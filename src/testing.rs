//! Test doubles shared by the unit tests

use std::sync::Mutex;
use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::traits::Client;

/// Client that records what it was asked to send
pub struct StubClient {
    nickname: String,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl StubClient {
    pub fn new(nickname: &str) -> Self {
        Self {
            nickname: nickname.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Client for StubClient {
    fn nickname(&self) -> &str {
        &self.nickname
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
