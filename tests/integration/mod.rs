// Integration tests for the restock watcher
// These tests run the real fetcher, notifier and state file against wiremock servers

pub mod fetch_tests;
pub mod notifier_tests;

use restock_watcher::AppConfig;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WEBHOOK_PATH: &str = "/api/webhooks/1/token";

pub const IN_STOCK_PAGE: &str = r#"<html><body>
    <span id="productTitle"> Console de jeu </span>
    <div id="imgTagWrapperId">
      <img src="https://img.example/small.jpg" data-old-hires="https://img.example/large.jpg">
    </div>
    <span class="a-price"><span class="a-offscreen">1 234,56 €</span></span>
    <input id="add-to-cart-button" type="submit">
    <div offer-display-feature-name="desktop-merchant-info">
      <span class="offer-display-feature-text-message">Amazon</span>
    </div>
</body></html>"#;

pub const OUT_OF_STOCK_PAGE: &str = r#"<html><body>
    <span id="productTitle">Console de jeu</span>
    <div id="availability"><span>Actuellement indisponible.</span></div>
</body></html>"#;

pub const MARKETPLACE_PAGE: &str = r#"<html><body>
    <div id="availability"><span>En stock</span></div>
    <div offer-display-feature-name="desktop-merchant-info">
      <span class="offer-display-feature-text-message">Amazon Marketplace Seller</span>
    </div>
</body></html>"#;

/// Mock servers standing in for the retailer and Discord, plus a scratch
/// directory for the state file.
pub struct TestEnv {
    pub retailer: MockServer,
    pub discord: MockServer,
    pub dir: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self {
            retailer: MockServer::start().await,
            discord: MockServer::start().await,
            dir: TempDir::new().expect("temp dir"),
        }
    }

    /// Test configuration for integration tests
    pub fn config(&self, asins: &[&str]) -> AppConfig {
        let mut config = AppConfig::default();
        config.watcher.asins = asins.iter().map(|a| a.to_string()).collect();
        config.watcher.state_file = self.dir.path().join("state.json");
        config.watcher.error_backoff_min_ms = 0;
        config.watcher.error_backoff_max_ms = 0;
        config.watcher.jitter_ms = 0;
        config.retailer.base_url = self.retailer.uri();
        config.scraper.request_timeout = 5;
        config.scraper.retry.backoff_base_ms = 1;
        config.scraper.retry.max_backoff_ms = 5;
        config.notifications.discord.webhook_url =
            Some(format!("{}{}", self.discord.uri(), WEBHOOK_PATH));
        config.notifications.discord.timeout = 5;
        config
    }

    pub async fn serve_page(&self, asin: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/dp/{}", asin)))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.retailer)
            .await;
    }

    pub async fn accept_webhooks(&self) {
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.discord)
            .await;
    }

    pub fn write_state(&self, json: &str) {
        std::fs::write(self.dir.path().join("state.json"), json).expect("write state");
    }

    pub fn read_state(&self) -> serde_json::Value {
        let data = std::fs::read_to_string(self.dir.path().join("state.json")).expect("read state");
        serde_json::from_str(&data).expect("state json")
    }

    /// Bodies of every webhook call received so far.
    pub async fn webhook_payloads(&self) -> Vec<serde_json::Value> {
        self.discord
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("webhook json"))
            .collect()
    }
}
