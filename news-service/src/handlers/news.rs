use crate::models::Summary;
use crate::services::CategoryFilter;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct NewsParams {
    pub category: Option<String>,
}

impl NewsParams {
    /// Reads the query pairs leniently. A repeated `category` keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let category = pairs
            .into_iter()
            .find(|(key, _)| key == "category")
            .map(|(_, value)| value);
        Self { category }
    }
}

/// `GET /news?category=<name>`: every summary whose category equals `name`
/// ignoring case, or all summaries for `all` or no parameter.
pub async fn list_news(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Summary>>, AppError> {
    let params = NewsParams::from_pairs(pairs);
    let filter = CategoryFilter::from_param(params.category.as_deref());

    let summaries = state.store.find_summaries(&filter).await.map_err(|e| {
        tracing::error!(error = %e, filter = ?filter, "Error fetching news");
        AppError::DatabaseError(anyhow::Error::new(e))
    })?;

    tracing::info!(filter = ?filter, count = summaries.len(), "Fetched news");
    Ok(Json(summaries))
}
