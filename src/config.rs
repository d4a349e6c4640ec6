use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use url::Url;

/// Environment variable holding the Discord webhook URL.
pub const WEBHOOK_ENV_VAR: &str = "DISCORD_WEBHOOK_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub watcher: WatcherConfig,
    pub retailer: RetailerConfig,
    pub scraper: ScraperConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Fixed list of identifiers; when empty, `asins_file` is read instead.
    pub asins: Vec<String>,
    pub asins_file: PathBuf,
    pub state_file: PathBuf,
    pub check_interval_secs: u64,
    pub jitter_ms: u64,
    pub error_backoff_min_ms: u64,
    pub error_backoff_max_ms: u64,
    pub notify_on_first_seen: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            asins: Vec::new(),
            asins_file: PathBuf::from("asins.txt"),
            state_file: PathBuf::from("state.json"),
            check_interval_secs: 30,
            jitter_ms: 5_000,
            error_backoff_min_ms: 5_000,
            error_backoff_max_ms: 15_000,
            notify_on_first_seen: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetailerConfig {
    pub base_url: String,
    pub merchant_name: String,
    pub in_stock_phrase: String,
    pub currency_symbol: String,
    pub accept_language: String,
    pub selectors: SelectorConfig,
}

impl Default for RetailerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.amazon.fr".to_string(),
            merchant_name: "Amazon".to_string(),
            in_stock_phrase: "En stock".to_string(),
            currency_symbol: "€".to_string(),
            accept_language: "fr-FR,fr;q=0.9,en;q=0.8".to_string(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl RetailerConfig {
    /// Canonical product page for an identifier.
    pub fn product_url(&self, asin: &str) -> String {
        format!("{}/dp/{}", self.base_url.trim_end_matches('/'), asin)
    }
}

/// CSS selectors describing the retailer's product page markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: String,
    /// Tried in order, first match wins.
    pub images: Vec<String>,
    pub add_to_cart: String,
    pub availability: String,
    pub merchant_info: String,
    pub fulfiller_info: String,
    pub price: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: "#productTitle".to_string(),
            images: vec!["#imgTagWrapperId img".to_string(), "#landingImage".to_string()],
            add_to_cart: "#add-to-cart-button".to_string(),
            availability: "#availability".to_string(),
            merchant_info: r#"[offer-display-feature-name="desktop-merchant-info"] .offer-display-feature-text-message"#.to_string(),
            fulfiller_info: r#"[offer-display-feature-name="desktop-fulfiller-info"] .offer-display-feature-text-message"#.to_string(),
            price: ".a-price .a-offscreen".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub user_agents: Vec<String>,
    pub retry: RetryConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: 15,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Safari/605.1.15".to_string(),
            ],
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub backoff_base_ms: u64,
    pub max_backoff_ms: u64,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base_ms: 1_000,
            max_backoff_ms: 120_000,
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub timeout: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: None,
            avatar_url: None,
            timeout: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("watcher.log"),
            level: "info".to_string(),
            stderr: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "WATCHER__"
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.notifications.discord.webhook_url.is_none() {
            config.notifications.discord.webhook_url =
                env::var(WEBHOOK_ENV_VAR).ok().filter(|v| !v.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.notifications.discord.webhook_url {
            None => {
                return Err(ConfigError::Message(format!("{} is not set", WEBHOOK_ENV_VAR)));
            }
            Some(url) if !is_http_url(url) => {
                return Err(ConfigError::Message("Invalid webhook URL format".into()));
            }
            Some(_) => {}
        }

        if self.notifications.discord.timeout == 0 {
            return Err(ConfigError::Message("Webhook timeout must be greater than 0".into()));
        }

        if !is_http_url(&self.retailer.base_url) {
            return Err(ConfigError::Message("Invalid retailer base URL format".into()));
        }

        if self.retailer.merchant_name.trim().is_empty() {
            return Err(ConfigError::Message("Retailer merchant_name must not be empty".into()));
        }

        if self.scraper.user_agents.is_empty() {
            return Err(ConfigError::Message("Scraper user_agents must not be empty".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.watcher.check_interval_secs == 0 {
            return Err(ConfigError::Message(
                "Watcher check_interval_secs must be greater than 0".into(),
            ));
        }

        if self.watcher.error_backoff_min_ms > self.watcher.error_backoff_max_ms {
            return Err(ConfigError::Message(
                "Watcher error_backoff_min_ms cannot exceed error_backoff_max_ms".into(),
            ));
        }

        Ok(())
    }
}

fn is_http_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
