use crate::models::Summary;
use crate::services::CategoryFilter;
use async_trait::async_trait;
use service_core::error::AppError;

/// Read access to the summary collection.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Returns the matching records in store iteration order.
    async fn find_summaries(&self, filter: &CategoryFilter) -> Result<Vec<Summary>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Stand-in used when the store client could not be created at startup.
///
/// The service keeps serving; every store operation fails.
pub struct DisconnectedStore {
    reason: String,
}

impl DisconnectedStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> AppError {
        AppError::DatabaseError(anyhow::anyhow!(
            "database client unavailable: {}",
            self.reason
        ))
    }
}

#[async_trait]
impl SummaryStore for DisconnectedStore {
    async fn find_summaries(&self, _filter: &CategoryFilter) -> Result<Vec<Summary>, AppError> {
        Err(self.error())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(self.error())
    }
}
