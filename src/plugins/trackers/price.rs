use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses and formats prices as the retailer prints them, e.g. `1 234,56 €`.
#[derive(Debug, Clone)]
pub struct PriceTracker {
    currency_symbol: String,
}

impl Default for PriceTracker {
    fn default() -> Self {
        Self::new("€")
    }
}

impl PriceTracker {
    pub fn new(currency_symbol: &str) -> Self {
        Self {
            currency_symbol: currency_symbol.to_string(),
        }
    }

    /// Strips whitespace thousands separators (plain, NBSP and narrow NBSP),
    /// keeps digits and decimal separators, and reads `,` as the decimal point.
    /// Returns `None` instead of failing when the text is not a number.
    pub fn parse(&self, text: &str) -> Option<Decimal> {
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        match Decimal::from_str(&cleaned) {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!("Could not convert price {:?}: {}", text.trim(), e);
                None
            }
        }
    }

    pub fn format(&self, price: Option<Decimal>) -> String {
        match price {
            Some(price) => format!("{:.2} {}", price, self.currency_symbol),
            None => "unknown".to_string(),
        }
    }
}
