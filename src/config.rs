use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TelegramConfig {
    /// Secret bot token. Also used as the webhook path.
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Public base URL the platform delivers updates to, e.g. "https://bot.example.com/"
    #[serde(default)]
    pub public_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_api_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_url: String::new(),
            port: default_port(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Build the configuration from the process environment only.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file, then let environment variables override it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(url) = lookup("URL") {
            self.server.public_url = url;
        }
        if let Some(api_url) = lookup("TELEGRAM_API_URL").filter(|s| !s.is_empty()) {
            self.telegram.api_url = api_url;
        }
        if let Some(port) = lookup("PORT").filter(|s| !s.is_empty()) {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        Ok(())
    }

    /// The URL registered with the platform: public URL followed by the token.
    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.server.public_url, self.telegram.bot_token)
    }

    /// Path the webhook handler is mounted on, if a token is configured.
    pub fn webhook_path(&self) -> Option<String> {
        if self.telegram.bot_token.is_empty() {
            None
        } else {
            Some(format!("/{}", self.telegram.bot_token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert!(config.telegram.bot_token.is_empty());
        assert!(config.webhook_path().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("BOT_TOKEN", "123:abc"),
                ("URL", "https://bot.example.com/"),
                ("PORT", "9000"),
            ]))
            .unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.server.public_url, "https://bot.example.com/");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.webhook_url(), "https://bot.example.com/123:abc");
        assert_eq!(config.webhook_path().as_deref(), Some("/123:abc"));
    }

    #[test]
    fn test_empty_port_keeps_default() {
        let mut config = Config::default();
        config.apply_env(env(&[("PORT", "")])).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT value"));
    }

    #[test]
    fn test_toml_sections_with_defaults() {
        let config: Config = toml::from_str(
            r#"
[telegram]
bot_token = "t0k"

[server]
public_url = "https://example.org/"
"#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token, "t0k");
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.webhook_url(), "https://example.org/t0k");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }
}
