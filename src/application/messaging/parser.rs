//! Command parser - Extracts a command name and arguments from a chat line

use std::cmp::Reverse;
use regex_lite::{escape, Regex};

/// How the bot may be addressed with a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    /// Prefix string such as `!` in `!foo`. Empty disables prefix addressing.
    pub prefix_char: String,
    /// Allow `<nick>: foo`, `<nick>, foo`, `<nick> --> foo` ...
    pub botnick: bool,
    /// Compare command names case-insensitively
    pub ignore_case: bool,
}

impl Default for Addressing {
    fn default() -> Self {
        Self {
            prefix_char: "!".to_string(),
            botnick: true,
            ignore_case: false,
        }
    }
}

/// Parses incoming text into `(command, args)` for a set of candidate names
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    addressing: Addressing,
}

impl CommandParser {
    pub fn new(addressing: Addressing) -> Self {
        Self { addressing }
    }

    pub fn addressing(&self) -> &Addressing {
        &self.addressing
    }

    /// Parse `text` against the candidate command `names`.
    ///
    /// Returns the name that was used and the whitespace separated arguments
    /// that follow it, or an empty name and no arguments when the text is not
    /// addressed to any of the names.
    pub fn parse<'a, I>(&self, botnick: &str, text: &str, names: I) -> (String, Vec<String>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(pattern) = self.build_pattern(names) else {
            return (String::new(), Vec::new());
        };

        for body in self.addressed_bodies(botnick, text) {
            let Some(caps) = pattern.captures(body) else {
                continue;
            };

            let command = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            let args = caps
                .get(2)
                .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();

            return (command, args);
        }

        (String::new(), Vec::new())
    }

    /// Candidate command bodies of `text`, in the order they are tried.
    ///
    /// Prefix addressing comes first. Nickname addressing needs the nick
    /// followed by non-word characters ending in whitespace; later splits are
    /// tried before earlier ones so `helga: --> foo` lands on `foo`.
    fn addressed_bodies<'t>(&self, botnick: &str, text: &'t str) -> Vec<&'t str> {
        let mut bodies = Vec::new();

        let prefix = self.addressing.prefix_char.as_str();
        if !prefix.is_empty() {
            if let Some(body) = strip_leading(text, prefix, self.addressing.ignore_case) {
                bodies.push(body);
            }
        }

        if !self.addressing.botnick || botnick.is_empty() {
            return bodies;
        }

        let Some(after) = strip_leading(text, botnick, self.addressing.ignore_case) else {
            return bodies;
        };

        // `helgabot` or `helgaбот` is somebody else
        let mut splits: Vec<&'t str> = after
            .char_indices()
            .take_while(|(_, c)| !is_word_char(*c))
            .filter(|(_, c)| c.is_whitespace())
            .map(|(i, c)| &after[i + c.len_utf8()..])
            .collect();
        splits.reverse();
        bodies.extend(splits);

        bodies
    }

    fn build_pattern<'a, I>(&self, names: I) -> Option<Regex>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut choices: Vec<&str> = names.into_iter().filter(|n| !n.is_empty()).collect();
        if choices.is_empty() {
            return None;
        }

        // Longest first so a short alias never shadows a longer one
        choices.sort_by_key(|c| Reverse(c.chars().count()));
        let choices = choices.iter().map(|c| escape(c)).collect::<Vec<_>>().join("|");

        let flags = if self.addressing.ignore_case { "(?is)" } else { "(?s)" };
        let pattern = format!(r"{}^({})(?:\s+(.*))?$", flags, choices);

        match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::debug!("Failed to build command pattern {}: {}", pattern, e);
                None
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `text` without its leading `lead`, compared per char when ignoring case
fn strip_leading<'t>(text: &'t str, lead: &str, ignore_case: bool) -> Option<&'t str> {
    if !ignore_case {
        return text.strip_prefix(lead);
    }

    let mut rest = text.chars();
    for expected in lead.chars() {
        let actual = rest.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(rest.as_str())
}
