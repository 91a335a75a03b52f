pub mod notifier;
pub mod reporter;

pub use notifier::{NotificationResult, NotifierPlugin};
pub use reporter::StatusReporter;

#[cfg(test)]
pub use reporter::MockStatusReporter;
