//! History fetch use case.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::entities::HistoryEntry;
use crate::domain::errors::HistoryError;
use crate::domain::ports::HistoryPort;

/// Loads the list of previously generated results.
#[derive(Clone)]
pub struct FetchHistoryUseCase {
    history_port: Arc<dyn HistoryPort>,
}

impl FetchHistoryUseCase {
    /// Creates new fetch use case.
    #[must_use]
    pub const fn new(history_port: Arc<dyn HistoryPort>) -> Self {
        Self { history_port }
    }

    /// Executes the fetch.
    ///
    /// # Errors
    /// Returns error on non-OK status, transport failure, or unreadable JSON.
    pub async fn execute(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        match self.history_port.fetch_history().await {
            Ok(entries) => {
                info!(count = entries.len(), "History loaded");
                Ok(entries)
            }
            Err(e) => {
                error!(error = %e, "Error fetching face swap history");
                Err(e)
            }
        }
    }
}
