use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Telegram,
    Console,
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformKind::Telegram => write!(f, "telegram"),
            PlatformKind::Console => write!(f, "console"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub apis: ApiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlatformConfig {
    #[serde(default)]
    pub kind: PlatformKind,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default)]
    pub openweathermap_api_key: String,
    #[serde(default)]
    pub newsapi_key: String,
    /// Optional; `/prompt` fails softly without it
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_news_url")]
    pub news_url: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_random_word_url")]
    pub random_word_url: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Echo unmatched messages back (the echo-bot variant)
    #[serde(default)]
    pub echo_unmatched: bool,
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,
    #[serde(default = "default_greet_image_url")]
    pub greet_image_url: String,
    #[serde(default = "default_repo_url")]
    pub repo_url: String,
    #[serde(default = "default_author_url")]
    pub author_url: String,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_news_url() -> String {
    "https://newsapi.org/v2/everything".to_string()
}

fn default_catalog_url() -> String {
    "https://fakestoreapi.com".to_string()
}

fn default_random_word_url() -> String {
    "https://random-word-api.herokuapp.com/word".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_command_prefix() -> String {
    "/".to_string()
}

fn default_handler_timeout_secs() -> u64 {
    30
}

fn default_greet_image_url() -> String {
    "https://s3.amazonaws.com/pix.iemoji.com/images/emoji/apple/ios-12/256/speaking-head.png"
        .to_string()
}

fn default_repo_url() -> String {
    "https://github.com/hjklhjklhjklhhh/bot".to_string()
}

fn default_author_url() -> String {
    "https://github.com/hjklhjklhjklhhh".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            openweathermap_api_key: String::new(),
            newsapi_key: String::new(),
            openai_api_key: String::new(),
            openai_model: default_openai_model(),
            weather_url: default_weather_url(),
            news_url: default_news_url(),
            catalog_url: default_catalog_url(),
            random_word_url: default_random_word_url(),
            openai_base_url: default_openai_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            echo_unmatched: false,
            handler_timeout_secs: default_handler_timeout_secs(),
            greet_image_url: default_greet_image_url(),
            repo_url: default_repo_url(),
            author_url: default_author_url(),
        }
    }
}

impl Config {
    /// Load the config file (if present), apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            info!(
                "Config file {} not found, using defaults and environment",
                path.display()
            );
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML configuration")
    }

    /// Override secrets and model from environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };
        set(&mut self.telegram.bot_token, "BOT_TOKEN");
        set(&mut self.apis.openweathermap_api_key, "OPENWEATHERMAP_API_KEY");
        set(&mut self.apis.newsapi_key, "NEWSAPI_KEY");
        set(&mut self.apis.openai_api_key, "OPENAI_API_KEY");
        set(&mut self.apis.openai_model, "OPENAI_MODEL");
    }

    /// Reject configurations the bot cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.platform.kind == PlatformKind::Telegram && self.telegram.bot_token.trim().is_empty()
        {
            anyhow::bail!("bot token cannot be empty (set [telegram] bot_token or BOT_TOKEN)");
        }
        if self.apis.openweathermap_api_key.trim().is_empty() {
            anyhow::bail!(
                "weather api key cannot be empty (set [apis] openweathermap_api_key or OPENWEATHERMAP_API_KEY)"
            );
        }
        if self.apis.newsapi_key.trim().is_empty() {
            anyhow::bail!("news api key cannot be empty (set [apis] newsapi_key or NEWSAPI_KEY)");
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("[http] timeout_secs must be greater than zero");
        }
        if self.bot.handler_timeout_secs == 0 {
            anyhow::bail!("[bot] handler_timeout_secs must be greater than zero");
        }
        if self.bot.command_prefix.chars().count() != 1 {
            anyhow::bail!(
                "[bot] command_prefix must be a single character, got {:?}",
                self.bot.command_prefix
            );
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.bot.handler_timeout_secs)
    }

    /// The single command prefix character
    pub fn command_prefix(&self) -> char {
        self.bot.command_prefix.chars().next().unwrap_or('/')
    }

    pub fn has_completion_key(&self) -> bool {
        !self.apis.openai_api_key.trim().is_empty()
    }
}
