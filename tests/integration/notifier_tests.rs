use super::*;
use restock_watcher::models::ProductSnapshot;
use restock_watcher::plugins::notifiers::DiscordNotifier;
use restock_watcher::plugins::traits::{NotificationEvent, Notifier};
use restock_watcher::AppError;
use rust_decimal::Decimal;
use std::str::FromStr;

fn restock_event(env: &TestEnv) -> NotificationEvent {
    NotificationEvent {
        asin: "X1".to_string(),
        product_url: format!("{}/dp/X1", env.retailer.uri()),
        snapshot: ProductSnapshot {
            title: Some("Console de jeu".to_string()),
            image_url: None,
            price: Some(Decimal::from_str("1234.56").unwrap()),
            available: true,
            sold_by_retailer: true,
        },
    }
}

#[tokio::test]
async fn test_webhook_receives_embed() -> anyhow::Result<()> {
    let env = TestEnv::start().await;
    env.accept_webhooks().await;

    let notifier = DiscordNotifier::new(&env.config(&["X1"]))?;
    notifier.notify(&restock_event(&env)).await?;

    let payloads = env.webhook_payloads().await;
    assert_eq!(payloads.len(), 1);

    let embed = &payloads[0]["embeds"][0];
    assert_eq!(embed["title"], "Console de jeu");
    assert_eq!(embed["url"], format!("{}/dp/X1", env.retailer.uri()));
    assert_eq!(embed["description"], "Sold and shipped by Amazon\nPrice: 1234.56 €");
    assert!(embed.get("thumbnail").is_none());
    Ok(())
}

#[tokio::test]
async fn test_webhook_failure_is_delivery_error() -> anyhow::Result<()> {
    let env = TestEnv::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&env.discord)
        .await;

    let notifier = DiscordNotifier::new(&env.config(&["X1"]))?;
    let err = notifier.notify(&restock_event(&env)).await.unwrap_err();

    assert!(matches!(err, AppError::Delivery(_)));
    Ok(())
}
