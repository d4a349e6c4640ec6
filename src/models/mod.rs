use serde::{Deserialize, Serialize};

pub mod product;

// Re-exports for convenience
pub use product::*;

/// How an identifier's combined availability moved between two observations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockTransition {
    /// No prior record for this identifier.
    FirstSeen { available: bool },
    Restocked,
    StillAvailable,
    SoldOut,
    StillUnavailable,
}

impl StockTransition {
    pub fn between(previous: Option<bool>, current: bool) -> Self {
        match (previous, current) {
            (None, available) => StockTransition::FirstSeen { available },
            (Some(false), true) => StockTransition::Restocked,
            (Some(true), true) => StockTransition::StillAvailable,
            (Some(true), false) => StockTransition::SoldOut,
            (Some(false), false) => StockTransition::StillUnavailable,
        }
    }

    /// Whether this transition is a False→True edge worth a notification.
    /// A first sighting only counts when `notify_on_first_seen` is set.
    pub fn should_notify(&self, notify_on_first_seen: bool) -> bool {
        match self {
            StockTransition::Restocked => true,
            StockTransition::FirstSeen { available } => *available && notify_on_first_seen,
            _ => false,
        }
    }

    /// Whether the stored value has to be written.
    pub fn changes_state(&self) -> bool {
        matches!(
            self,
            StockTransition::FirstSeen { .. }
                | StockTransition::Restocked
                | StockTransition::SoldOut
        )
    }
}
