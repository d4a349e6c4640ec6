pub mod notifier;

pub use notifier::{NotificationEvent, Notifier};
