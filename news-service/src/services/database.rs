use crate::models::Summary;
use crate::services::{CategoryFilter, SummaryStore};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{bson::doc, Client as MongoClient, Collection, Database};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    /// Creates the client. The driver connects lazily, so this only fails on a bad URI.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub fn summaries(&self) -> Collection<Summary> {
        self.db.collection(&self.collection)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl SummaryStore for MongoDb {
    async fn find_summaries(&self, filter: &CategoryFilter) -> Result<Vec<Summary>, AppError> {
        let query = filter.to_document();
        tracing::debug!(query = %query, "Querying summaries");

        let mut cursor = self
            .summaries()
            .find(query, filter.find_options())
            .await
            .map_err(AppError::from)?;

        let mut summaries = Vec::new();
        while let Some(summary) = cursor.try_next().await.map_err(AppError::from)? {
            summaries.push(summary);
        }

        Ok(summaries)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
