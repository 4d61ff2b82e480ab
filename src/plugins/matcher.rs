//! Match plugins - respond when a pattern is found in a message

use std::fmt;
use std::sync::Arc;

use regex_lite::Regex;

use crate::application::errors::{PluginError, PluginResult};
use crate::domain::entities::{Message, Response};
use super::trait_def::{Context, Plugin};

/// Result of a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matches {
    /// Captured groups in order. Empty when the pattern has no groups,
    /// which still counts as a match.
    Captures(Vec<String>),
    /// A non-list value produced by a predicate, passed through as is
    Value(String),
}

impl Matches {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Matches::Captures(caps) => caps,
            Matches::Value(value) => std::slice::from_ref(value),
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.as_slice().first().map(String::as_str)
    }
}

/// Conversion of predicate return values into a match outcome
pub trait IntoMatches {
    fn into_matches(self) -> Option<Matches>;
}

impl IntoMatches for bool {
    fn into_matches(self) -> Option<Matches> {
        self.then(|| Matches::Captures(Vec::new()))
    }
}

impl IntoMatches for Matches {
    fn into_matches(self) -> Option<Matches> {
        Some(self)
    }
}

impl IntoMatches for Vec<String> {
    fn into_matches(self) -> Option<Matches> {
        Some(Matches::Captures(self))
    }
}

impl IntoMatches for Vec<&str> {
    fn into_matches(self) -> Option<Matches> {
        Some(Matches::Captures(self.into_iter().map(str::to_string).collect()))
    }
}

impl IntoMatches for String {
    fn into_matches(self) -> Option<Matches> {
        Some(Matches::Value(self))
    }
}

impl IntoMatches for &str {
    fn into_matches(self) -> Option<Matches> {
        Some(Matches::Value(self.to_string()))
    }
}

impl<T: IntoMatches> IntoMatches for Option<T> {
    fn into_matches(self) -> Option<Matches> {
        self.and_then(IntoMatches::into_matches)
    }
}

/// A predicate that cannot handle its input counts as no match
impl<T: IntoMatches, E: fmt::Display> IntoMatches for Result<T, E> {
    fn into_matches(self) -> Option<Matches> {
        match self {
            Ok(value) => value.into_matches(),
            Err(e) => {
                tracing::debug!("Match predicate rejected input: {}", e);
                None
            }
        }
    }
}

type Predicate = Arc<dyn Fn(&str) -> Option<Matches> + Send + Sync>;

/// What a `Match` looks for
#[derive(Clone)]
pub enum Pattern {
    Regex(Regex),
    Predicate(Predicate),
}

impl Pattern {
    pub fn regex(pattern: &str) -> Result<Self, PluginError> {
        Regex::new(pattern)
            .map(Pattern::Regex)
            .map_err(|e| PluginError::Failed(format!("invalid pattern '{}': {}", pattern, e)))
    }

    pub fn predicate<F, R>(predicate: F) -> Self
    where
        F: Fn(&str) -> R + Send + Sync + 'static,
        R: IntoMatches,
    {
        Pattern::Predicate(Arc::new(move |text: &str| predicate(text).into_matches()))
    }

    /// Search `text` for the pattern
    pub fn find(&self, text: &str) -> Option<Matches> {
        match self {
            Pattern::Regex(re) => re.captures(text).map(|caps| {
                let groups = (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                Matches::Captures(groups)
            }),
            Pattern::Predicate(predicate) => predicate(text),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Regex(re) => write!(f, "Regex({})", re.as_str()),
            Pattern::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

/// Match runner function type: `(ctx, message, matches)`
pub type MatchRunner =
    Arc<dyn Fn(&Context<'_>, &Message, &Matches) -> PluginResult<Response> + Send + Sync>;

/// A plugin that responds whenever its pattern is found in a message
#[derive(Clone)]
pub struct Match {
    pub pattern: Pattern,
    pub priority: i32,
    runner: Option<MatchRunner>,
}

impl Match {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            priority: 0,
            runner: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_runner<F>(mut self, runner: F) -> Self
    where
        F: Fn(&Context<'_>, &Message, &Matches) -> PluginResult<Response> + Send + Sync + 'static,
    {
        self.runner = Some(Arc::new(runner));
        self
    }

    pub(crate) fn with_shared_runner(mut self, runner: MatchRunner) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn find(&self, text: &str) -> Option<Matches> {
        self.pattern.find(text)
    }
}

impl Plugin for Match {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn process(&self, ctx: &Context<'_>, message: &Message) -> PluginResult<Response> {
        let Some(matches) = self.find(&message.text) else {
            return Ok(Response::Empty);
        };

        match &self.runner {
            Some(runner) => runner(ctx, message, &matches),
            None => Err(PluginError::Failed(format!("match {:?} has no runner", self.pattern))),
        }
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("pattern", &self.pattern)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
