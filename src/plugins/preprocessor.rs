use std::fmt;
use std::sync::Arc;

use crate::application::errors::PluginResult;
use crate::domain::entities::Message;
use super::trait_def::{Context, Plugin};

/// Preprocess runner function type: `(ctx, message) -> message`
pub type PreprocessRunner = Arc<dyn Fn(&Context<'_>, Message) -> PluginResult<Message> + Send + Sync>;

/// A plugin that only rewrites messages before they are processed
#[derive(Clone)]
pub struct Preprocessor {
    pub priority: i32,
    runner: PreprocessRunner,
}

impl Preprocessor {
    pub fn new<F>(runner: F) -> Self
    where
        F: Fn(&Context<'_>, Message) -> PluginResult<Message> + Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(runner))
    }

    pub(crate) fn from_shared(runner: PreprocessRunner) -> Self {
        Self { priority: 0, runner }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Plugin for Preprocessor {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn preprocess(&self, ctx: &Context<'_>, message: Message) -> PluginResult<Message> {
        (self.runner)(ctx, message)
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessor")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
