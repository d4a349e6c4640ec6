use scraper::{ElementRef, Html, Selector};

use crate::config::RetailerConfig;
use crate::models::ProductSnapshot;
use crate::plugins::trackers::PriceTracker;
use crate::utils::error::{AppError, Result};

/// Field extractors over a product page, built once from the retailer
/// configuration. Every extractor tolerates missing markup and returns an
/// absent value instead of an error.
pub struct ProductExtractor {
    title: Selector,
    images: Vec<Selector>,
    add_to_cart: Selector,
    availability: Selector,
    merchant_info: Selector,
    fulfiller_info: Selector,
    price: Selector,
    merchant_name: String,
    in_stock_phrase: String,
    price_tracker: PriceTracker,
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| AppError::Selector {
        selector: selector.to_string(),
    })
}

/// Trimmed text of an element, `None` when it is blank.
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().and_then(element_text)
}

fn non_empty_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ProductExtractor {
    pub fn new(retailer: &RetailerConfig) -> Result<Self> {
        let selectors = &retailer.selectors;
        let images = selectors
            .images
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title: compile(&selectors.title)?,
            images,
            add_to_cart: compile(&selectors.add_to_cart)?,
            availability: compile(&selectors.availability)?,
            merchant_info: compile(&selectors.merchant_info)?,
            fulfiller_info: compile(&selectors.fulfiller_info)?,
            price: compile(&selectors.price)?,
            merchant_name: retailer.merchant_name.clone(),
            in_stock_phrase: retailer.in_stock_phrase.clone(),
            price_tracker: PriceTracker::new(&retailer.currency_symbol),
        })
    }

    pub fn extract(&self, html: &str) -> ProductSnapshot {
        let document = Html::parse_document(html);
        ProductSnapshot {
            title: self.title(&document),
            image_url: self.image_url(&document),
            price: self.price(&document),
            available: self.is_available(&document),
            sold_by_retailer: self.is_sold_by_retailer(&document),
        }
    }

    pub fn title(&self, document: &Html) -> Option<String> {
        first_text(document, &self.title)
    }

    /// First image found across the selector list; the high resolution
    /// `data-old-hires` attribute wins over `src`.
    pub fn image_url(&self, document: &Html) -> Option<String> {
        let image = self
            .images
            .iter()
            .find_map(|selector| document.select(selector).next())?;

        non_empty_attr(image, "data-old-hires").or_else(|| non_empty_attr(image, "src"))
    }

    pub fn is_available(&self, document: &Html) -> bool {
        if document.select(&self.add_to_cart).next().is_some() {
            return true;
        }

        first_text(document, &self.availability)
            .map(|text| text.contains(&self.in_stock_phrase))
            .unwrap_or(false)
    }

    /// Exact match on the merchant or fulfiller name, so that third-party
    /// sellers whose name merely contains the retailer's do not count.
    pub fn is_sold_by_retailer(&self, document: &Html) -> bool {
        [&self.merchant_info, &self.fulfiller_info]
            .into_iter()
            .filter_map(|selector| first_text(document, selector))
            .any(|text| text == self.merchant_name)
    }

    pub fn price(&self, document: &Html) -> Option<rust_decimal::Decimal> {
        let text = first_text(document, &self.price)?;
        self.price_tracker.parse(&text)
    }
}
