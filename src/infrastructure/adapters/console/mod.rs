//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use crate::application::errors::BotError;
use crate::domain::traits::Client;

/// Console client for local development, prints whatever the bot sends
pub struct ConsoleAdapter {
    nickname: String,
}

impl ConsoleAdapter {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
        }
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }
}

#[async_trait]
impl Client for ConsoleAdapter {
    fn nickname(&self) -> &str {
        &self.nickname
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        for line in text.lines() {
            println!("[{}] <{}> {}", channel, self.nickname, line);
        }
        Ok(())
    }
}

/// Line reader over stdin
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next trimmed input line, `None` at end of input
    pub async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, BotError> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}
