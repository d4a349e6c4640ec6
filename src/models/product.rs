use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields read from one fetch of a product page. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub available: bool,
    pub sold_by_retailer: bool,
}

impl ProductSnapshot {
    /// Combined availability: in stock and sold by the retailer itself.
    pub fn is_purchasable(&self) -> bool {
        self.available && self.sold_by_retailer
    }

    pub fn display_title(&self, asin: &str) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Product {}", asin),
        }
    }
}
