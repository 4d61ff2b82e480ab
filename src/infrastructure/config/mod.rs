//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::messaging::Addressing;
use crate::plugins::RegistrySettings;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub commands: CommandConfig,
    pub plugins: PluginConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub nick: String,
}

/// How users address commands to the bot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommandConfig {
    /// Prefix for `!command` style addressing, empty to disable
    pub prefix_char: String,
    /// Allow `nick: command` style addressing
    pub botnick: bool,
    pub ignore_case: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub first_responder_only: bool,
    /// Load only these plugins (all when unset)
    pub allow: Option<Vec<String>>,
    /// Never load these plugins
    pub deny: Vec<String>,
    /// Plugins enabled on every channel the bot joins
    pub default_channel: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdaptersConfig {
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// Channel console lines are posted to
    pub channel: String,
    /// Nick console lines are posted as
    pub nick: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nick: "helga".to_string(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        let addressing = Addressing::default();
        Self {
            prefix_char: addressing.prefix_char,
            botnick: addressing.botnick,
            ignore_case: addressing.ignore_case,
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            first_responder_only: false,
            allow: None,
            deny: Vec::new(),
            default_channel: Vec::new(),
        }
    }
}

impl Default for AdaptersConfig {
    fn default() -> Self {
        Self {
            console: Some(ConsoleConfig::default()),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: "#bots".to_string(),
            nick: "me".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Read(format!("Failed to read config {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(nick) = std::env::var("BOT_NICK") {
            config.bot.nick = nick;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.commands.prefix_char = prefix;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.nick.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.nick must not be empty".to_string()));
        }
        if self.commands.prefix_char.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue(
                "commands.prefix-char must not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }

    pub fn addressing(&self) -> Addressing {
        Addressing {
            prefix_char: self.commands.prefix_char.clone(),
            botnick: self.commands.botnick,
            ignore_case: self.commands.ignore_case,
        }
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            addressing: self.addressing(),
            first_responder_only: self.plugins.first_responder_only,
            allow: self.plugins.allow.clone(),
            deny: self.plugins.deny.clone(),
            default_channel: self.plugins.default_channel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("bot:\n  nick: snowbot\nplugins:\n  first-responder-only: true\n").unwrap();

        assert_eq!(config.bot.nick, "snowbot");
        assert!(config.plugins.first_responder_only);
        assert_eq!(config.commands.prefix_char, "!");
        assert!(config.commands.botnick);
        assert_eq!(config.adapters.console.as_ref().map(|c| c.channel.as_str()), Some("#bots"));
    }

    #[test]
    fn test_registry_settings_carry_plugin_lists() {
        let yaml = "
commands:
  prefix-char: '#'
plugins:
  allow: [foo, bar]
  deny: [bar]
  default-channel: [foo]
";
        let settings = Config::parse(yaml).unwrap().registry_settings();

        assert_eq!(settings.addressing.prefix_char, "#");
        assert_eq!(settings.allow, Some(vec!["foo".to_string(), "bar".to_string()]));
        assert_eq!(settings.deny, vec!["bar"]);
        assert_eq!(settings.default_channel, vec!["foo"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(Config::parse("bot:\n  nick: ''\n"), Err(ConfigError::InvalidValue(_))));
        assert!(matches!(Config::parse("bot: [\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.bot.nick, "helga");
    }
}
