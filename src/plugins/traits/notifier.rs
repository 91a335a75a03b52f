use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::utils::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub recipients: usize,
}

/// Trait for delivering new-product announcements (email, ...)
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    /// Announce `products`, in the order given. Never called with an empty
    /// slice by the poll loop.
    async fn notify(&self, products: &[Product]) -> Result<NotificationResult>;

    /// Connect and authenticate without sending anything.
    async fn test_connection(&self) -> Result<bool>;

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
