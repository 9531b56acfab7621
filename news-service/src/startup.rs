use crate::config::{MongoConfig, NewsConfig};
use crate::handlers;
use crate::services::{DisconnectedStore, MongoDb, SummaryStore};
use axum::{
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: NewsConfig,
    pub store: Arc<dyn SummaryStore>,
    /// Client for the passthrough proxy. Redirects are relayed, not followed.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: NewsConfig, store: Arc<dyn SummaryStore>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            store,
            http,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let prefix = state.config.proxy.prefix.clone();

    let service_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/news", get(handlers::list_news))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(request_id_middleware));

    // Proxied traffic skips the request-id layer so upstream sees the caller's headers as sent.
    let proxy_routes = Router::new()
        .route(&prefix, any(handlers::proxy_request))
        .route(&format!("{}/", prefix), any(handlers::proxy_request))
        .route(&format!("{}/*path", prefix), any(handlers::proxy_request));

    service_routes
        .merge(proxy_routes)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Creates the store client. A failure is logged and replaced by a store that
/// fails every read, so the service still starts.
pub async fn connect_store(config: &MongoConfig) -> Arc<dyn SummaryStore> {
    match MongoDb::connect(&config.uri, &config.database, &config.collection).await {
        Ok(db) => {
            let probe = db.clone();
            tokio::spawn(async move {
                match probe.health_check().await {
                    Ok(()) => tracing::info!(
                        database = %probe.database().name(),
                        "MongoDB connected"
                    ),
                    Err(e) => tracing::error!(error = %e, "MongoDB connection error"),
                }
            });
            Arc::new(db)
        }
        Err(e) => {
            tracing::error!(error = %e, "MongoDB connection error; /news will fail until restart");
            Arc::new(DisconnectedStore::new(e.to_string()))
        }
    }
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: NewsConfig) -> Result<Self, AppError> {
        let store = connect_store(&config.mongodb).await;
        Self::build_with_store(config, store).await
    }

    pub async fn build_with_store(
        config: NewsConfig,
        store: Arc<dyn SummaryStore>,
    ) -> Result<Self, AppError> {
        let port = config.common.port;
        let app = build_router(AppState::new(config, store)?);

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server running at http://localhost:{}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
