//! History listing port definition.

use async_trait::async_trait;

use crate::domain::entities::HistoryEntry;
use crate::domain::errors::HistoryError;

/// Port for the history listing service.
#[async_trait]
pub trait HistoryPort: Send + Sync {
    /// Fetches previously generated results, already validated and filtered.
    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
}
