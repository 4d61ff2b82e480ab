//! Turn plain functions into plugins
//!
//! A `Decorated` handle keeps the function callable as before and collects one
//! synthesized plugin per decoration. Decorating the same function twice
//! yields two independent plugins, each with its own names and priority.
//!
//! ```ignore
//! let foobar = Decorated::new(|_: &Context<'_>, _: &Message, cmd: &str, _: &[String]| -> PluginResult<Response> {
//!     Ok(Response::from(cmd))
//! })
//! .command(Command::new("bar"))
//! .command(Command::new("foo"));
//!
//! registry.register("foobar", foobar)?;
//! ```

use std::sync::Arc;

use crate::application::errors::PluginResult;
use crate::domain::entities::{Message, Response};
use super::command::{Command, CommandRunner};
use super::matcher::{Match, MatchRunner, Matches};
use super::preprocessor::{PreprocessRunner, Preprocessor};
use super::trait_def::{Context, Plugin, PluginEntry};

/// A function plus the plugins synthesized from it
pub struct Decorated<F> {
    func: Arc<F>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl<F> Decorated<F> {
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
            plugins: Vec::new(),
        }
    }

    /// The original function, callable with its original arguments
    pub fn function(&self) -> &F {
        &self.func
    }

    /// Synthesized plugins in decoration order
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }
}

impl<F> Decorated<F>
where
    F: Fn(&Context<'_>, &Message, &str, &[String]) -> PluginResult<Response> + Send + Sync + 'static,
{
    /// Also register the function as `command`
    pub fn command(mut self, command: Command) -> Self {
        let runner: CommandRunner = self.func.clone();
        self.plugins.push(Arc::new(command.with_shared_runner(runner)));
        self
    }
}

impl<F> Decorated<F>
where
    F: Fn(&Context<'_>, &Message, &Matches) -> PluginResult<Response> + Send + Sync + 'static,
{
    /// Also register the function as a match on `matcher`'s pattern
    pub fn matching(mut self, matcher: Match) -> Self {
        let runner: MatchRunner = self.func.clone();
        self.plugins.push(Arc::new(matcher.with_shared_runner(runner)));
        self
    }
}

impl<F> Decorated<F>
where
    F: Fn(&Context<'_>, Message) -> PluginResult<Message> + Send + Sync + 'static,
{
    /// Also register the function as a preprocessor
    pub fn preprocessor(mut self, priority: i32) -> Self {
        let runner: PreprocessRunner = self.func.clone();
        self.plugins.push(Arc::new(Preprocessor::from_shared(runner).with_priority(priority)));
        self
    }
}

impl<F> From<Decorated<F>> for PluginEntry {
    fn from(decorated: Decorated<F>) -> Self {
        PluginEntry::Decorated(decorated.plugins)
    }
}
