use std::fmt;
use std::sync::Arc;

use crate::application::errors::{PluginError, PluginResult};
use crate::application::messaging::CommandParser;
use crate::domain::entities::{Message, Response};
use super::trait_def::{Context, Plugin};

/// Command runner function type: `(ctx, message, command, args)`
pub type CommandRunner =
    Arc<dyn Fn(&Context<'_>, &Message, &str, &[String]) -> PluginResult<Response> + Send + Sync>;

/// A plugin that answers when the bot is addressed with a named command
#[derive(Clone)]
pub struct Command {
    pub command: String,
    pub aliases: Vec<String>,
    pub help: String,
    pub priority: i32,
    runner: Option<CommandRunner>,
}

impl Command {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            aliases: Vec::new(),
            help: String::new(),
            priority: 0,
            runner: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_runner<F>(mut self, runner: F) -> Self
    where
        F: Fn(&Context<'_>, &Message, &str, &[String]) -> PluginResult<Response> + Send + Sync + 'static,
    {
        self.runner = Some(Arc::new(runner));
        self
    }

    pub(crate) fn with_shared_runner(mut self, runner: CommandRunner) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Primary name followed by the aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.command.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn parse(&self, parser: &CommandParser, botnick: &str, text: &str) -> (String, Vec<String>) {
        parser.parse(botnick, text, self.names())
    }
}

impl Plugin for Command {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn process(&self, ctx: &Context<'_>, message: &Message) -> PluginResult<Response> {
        let (command, args) = self.parse(ctx.parser, ctx.nickname(), &message.text);
        if command.is_empty() {
            return Ok(Response::Empty);
        }

        tracing::debug!(command = %command, args = ?args, channel = %message.channel, "Running command");

        match &self.runner {
            Some(runner) => runner(ctx, message, command.as_str(), args.as_slice()),
            None => Err(PluginError::Failed(format!("command '{}' has no runner", self.command))),
        }
    }

    fn help(&self) -> Option<String> {
        if self.help.is_empty() {
            return None;
        }
        Some(format!("{}: {}", self.names().collect::<Vec<_>>().join(", "), self.help))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("command", &self.command)
            .field("aliases", &self.aliases)
            .field("help", &self.help)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
