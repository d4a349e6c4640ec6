// Value parsers used by the field extractors
pub mod price;

pub use price::PriceTracker;
