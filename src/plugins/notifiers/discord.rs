use crate::config::AppConfig;
use crate::plugins::trackers::PriceTracker;
use crate::plugins::traits::{NotificationEvent, Notifier};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const EMBED_COLOR: u32 = 0x00ff00;

pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    username: Option<String>,
    avatar_url: Option<String>,
    merchant_name: String,
    price_tracker: PriceTracker,
}

impl DiscordNotifier {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let discord = &config.notifications.discord;
        let webhook_url = discord
            .webhook_url
            .clone()
            .ok_or_else(|| AppError::MissingSetting {
                name: crate::config::WEBHOOK_ENV_VAR.to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(discord.timeout))
            .build()?;

        Ok(DiscordNotifier {
            client,
            webhook_url,
            username: discord.username.clone(),
            avatar_url: discord.avatar_url.clone(),
            merchant_name: config.retailer.merchant_name.clone(),
            price_tracker: PriceTracker::new(&config.retailer.currency_symbol),
        })
    }

    fn create_embed(&self, event: &NotificationEvent) -> serde_json::Value {
        let price = self.price_tracker.format(event.snapshot.price);
        let mut embed = json!({
            "title": event.snapshot.display_title(&event.asin),
            "url": event.product_url,
            "description": format!("Sold and shipped by {}\nPrice: {}", self.merchant_name, price),
            "color": EMBED_COLOR,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(image_url) = &event.snapshot.image_url {
            embed["thumbnail"] = json!({ "url": image_url });
        }

        embed
    }

    fn create_webhook_payload(&self, event: &NotificationEvent) -> serde_json::Value {
        let mut payload = json!({
            "embeds": [self.create_embed(event)]
        });

        // Add webhook customization
        if let Some(username) = &self.username {
            payload["username"] = json!(username);
        }

        if let Some(avatar_url) = &self.avatar_url {
            payload["avatar_url"] = json!(avatar_url);
        }

        payload
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        let payload = self.create_webhook_payload(event);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Delivery(format!("webhook responded with {}", status)));
        }

        tracing::info!(
            "Discord notification sent for {} ({})",
            event.asin,
            self.price_tracker.format(event.snapshot.price)
        );
        Ok(())
    }
}
