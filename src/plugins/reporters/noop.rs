use async_trait::async_trait;

use crate::models::StatusReport;
use crate::plugins::traits::StatusReporter;
use crate::utils::error::Result;

/// Used when status reporting is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

#[async_trait]
impl StatusReporter for NoopReporter {
    async fn report(&self, _report: &StatusReport) -> Result<()> {
        Ok(())
    }
}
