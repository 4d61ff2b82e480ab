use std::fmt;

/// An incoming chat line: who said what, where.
///
/// This is the tuple the preprocess chain rewrites, so every field is owned
/// and freely replaceable by a preprocessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: String,
    pub nick: String,
    pub text: String,
}

impl Message {
    pub fn new(channel: impl Into<String>, nick: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            nick: nick.into(),
            text: text.into(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} - {}", self.channel, self.nick, self.text)
    }
}
