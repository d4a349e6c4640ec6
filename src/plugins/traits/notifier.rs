use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::ProductSnapshot;
use crate::utils::error::Result;

/// A product that just came back in stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub asin: String,
    pub product_url: String,
    pub snapshot: ProductSnapshot,
}

/// Trait for implementing notification methods
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification. Failures are not retried by the caller.
    async fn notify(&self, event: &NotificationEvent) -> Result<()>;
}
