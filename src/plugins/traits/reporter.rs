use async_trait::async_trait;

use crate::models::StatusReport;
use crate::utils::error::Result;

/// Fire-and-forget run status sink. Failures are logged by the caller and
/// never retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn report(&self, report: &StatusReport) -> Result<()>;
}
