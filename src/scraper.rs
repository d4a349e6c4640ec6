use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tokio_retry::RetryIf;

use crate::config::{AppConfig, RetailerConfig, RetryConfig};
use crate::utils::error::{AppError, Result};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Source of raw product page markup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, asin: &str) -> Result<String>;
}

/// When and how often a failed GET is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub backoff_base: Duration,
    pub max_backoff: Duration,
    pub retry_statuses: HashSet<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            retry_statuses: config.retry_statuses.iter().copied().collect(),
        }
    }

    /// Delay before each retry: `base * 2^n`, capped.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(move |n| {
            let factor = 2u32.saturating_pow(n as u32);
            self.backoff_base.saturating_mul(factor).min(self.max_backoff)
        })
    }

    pub fn should_retry(&self, error: &AppError) -> bool {
        match error {
            AppError::HttpStatus { status, .. } => self.retry_statuses.contains(status),
            AppError::Http(e) => e.is_connect(),
            _ => false,
        }
    }
}

pub struct PageFetcher {
    client: Client,
    retailer: RetailerConfig,
    user_agents: Vec<String>,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        let language = HeaderValue::from_str(&config.retailer.accept_language).map_err(|e| {
            AppError::Parse {
                message: format!("invalid Accept-Language header: {}", e),
            }
        })?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.scraper.request_timeout))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            retailer: config.retailer.clone(),
            user_agents: config.scraper.user_agents.clone(),
            policy: RetryPolicy::from_config(&config.scraper.retry),
        })
    }

    fn random_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("Mozilla/5.0")
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let user_agent = self.random_user_agent();
        tracing::debug!("GET {} (user-agent: {})", url, user_agent);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, asin: &str) -> Result<String> {
        let url = self.retailer.product_url(asin);

        RetryIf::spawn(
            self.policy.delays(),
            || self.get_once(&url),
            |e: &AppError| {
                let retry = self.policy.should_retry(e);
                if retry {
                    tracing::warn!("Retrying fetch for {}: {}", asin, e);
                }
                retry
            },
        )
        .await
    }
}
