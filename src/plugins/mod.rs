pub mod traits;
pub mod trackers;
pub mod notifiers;

pub use traits::{NotificationEvent, Notifier};
