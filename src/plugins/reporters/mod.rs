// Status reporter implementations
pub mod home_assistant;
pub mod noop;

pub use home_assistant::HomeAssistantReporter;
pub use noop::NoopReporter;

use crate::config::StatusConfig;
use crate::plugins::traits::StatusReporter;
use crate::utils::error::Result;

/// Home Assistant when configured, otherwise a no-op.
pub fn from_config(config: &StatusConfig) -> Result<Box<dyn StatusReporter>> {
    Ok(match HomeAssistantReporter::from_config(config)? {
        Some(reporter) => {
            tracing::info!("Reporting status to {}", reporter.endpoint());
            Box::new(reporter)
        }
        None => Box::new(NoopReporter),
    })
}
