#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use news_service::config::{MongoConfig, NewsConfig, ProxyConfig};
use news_service::models::Summary;
use news_service::services::{CategoryFilter, SummaryStore};
use news_service::startup::{AppState, Application};
use reqwest::Url;
use serde_json::json;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

/// Store backed by a fixed list of records, filtered the way the collection is queried.
pub struct InMemoryStore {
    records: Vec<Summary>,
}

impl InMemoryStore {
    pub fn new(records: Vec<Summary>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl SummaryStore for InMemoryStore {
    async fn find_summaries(&self, filter: &CategoryFilter) -> Result<Vec<Summary>, AppError> {
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record.category.as_deref()))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn summary(title: &str, summary: &str, category: Option<&str>) -> Summary {
    Summary {
        title: Some(title.to_string()),
        summary: Some(summary.to_string()),
        category: category.map(str::to_string),
        ..Summary::default()
    }
}

/// The two records used throughout: one "Tech", one "sports".
pub fn sample_records() -> Vec<Summary> {
    vec![
        summary("A", "s1", Some("Tech")),
        summary("B", "s2", Some("sports")),
    ]
}

pub fn test_config(upstream: Url) -> NewsConfig {
    NewsConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: format!("news_test_{}", Uuid::new_v4().simple()),
            collection: "summaries".to_string(),
        },
        proxy: ProxyConfig {
            upstream,
            prefix: "/api".to_string(),
            max_body_bytes: 1024,
        },
        otlp_endpoint: None,
    }
}

pub fn unused_upstream() -> Url {
    Url::parse("http://127.0.0.1:9").expect("static URL")
}

/// Router over the given store, for `oneshot` tests.
pub fn router_with_store(store: Arc<dyn SummaryStore>) -> Router {
    let state = AppState::new(test_config(unused_upstream()), store)
        .expect("Failed to build application state");
    news_service::startup::build_router(state)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn(config: NewsConfig, store: Option<Arc<dyn SummaryStore>>) -> Self {
        let app = match store {
            Some(store) => Application::build_with_store(config, store).await,
            None => Application::build(config).await,
        }
        .expect("Failed to build test application");

        let port = app.port();
        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}

/// Upstream stand-in that echoes what it received as JSON.
///
/// `/api/redirect` answers 302 and `/api/fail` answers 503.
pub struct MockUpstream {
    pub url: Url,
    pub port: u16,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let port = listener.local_addr().expect("mock upstream address").port();

        let app = Router::new().fallback(echo);
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        MockUpstream {
            url: Url::parse(&format!("http://127.0.0.1:{}", port)).expect("mock upstream URL"),
            port,
        }
    }
}

async fn echo(req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    match parts.uri.path() {
        "/api/redirect" => {
            return (StatusCode::FOUND, [(header::LOCATION, "/api/elsewhere")]).into_response()
        }
        "/api/fail" => {
            return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response()
        }
        _ => {}
    }

    let header_value = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let payload = json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "host": header_value("host"),
        "x_custom": header_value("x-custom"),
        "x_request_id": header_value("x-request-id"),
        "content_type": header_value("content-type"),
        "body": String::from_utf8_lossy(&bytes),
    });

    let mut response = (StatusCode::OK, Json(payload)).into_response();
    let headers = response.headers_mut();
    headers.insert("x-upstream", header::HeaderValue::from_static("mock"));
    headers.append(header::SET_COOKIE, header::HeaderValue::from_static("a=1"));
    headers.append(header::SET_COOKIE, header::HeaderValue::from_static("b=2"));
    response
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    use http_body_util::BodyExt;
    body.collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}
