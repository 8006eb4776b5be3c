//! Griot API Gateway
//!
//! Thin HTTP transport over the answering pipeline. Handles:
//! - Request parsing and validation
//! - Routing to the pipeline's single entry point
//! - Observability (logging, metrics, request ids)
//!
//! Everything the pipeline depends on is constructed exactly once here and
//! injected; nothing is re-created per request.

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use griot_common::{
    config::AppConfig,
    db::{DbPool, Repository},
    embeddings,
    metrics,
};
use griot_pipeline::{
    create_generator, AnswerPipeline, PgMemoryStore, PipelineOptions, VectorRetriever,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub pipeline: Arc<AnswerPipeline>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.observability.log_level.clone()));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting Griot API Gateway v{}", griot_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr =
            SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db.clone());

    // Construct the pipeline collaborators once
    let embedder = embeddings::create_embedder(&config.embedding)?;
    let generator = create_generator(&config.generation)?;
    let retriever = Arc::new(VectorRetriever::new(repo.clone(), embedder));
    let memory = Arc::new(PgMemoryStore::new(repo));

    let pipeline = Arc::new(AnswerPipeline::new(
        retriever,
        memory,
        generator,
        PipelineOptions::from_config(&config),
    ));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        pipeline,
    };

    // Build the router
    let app = create_router(state, config.request_timeout());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, request_timeout: std::time::Duration) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Chat endpoint (the pipeline's single entry point)
        .route("/chat", post(handlers::chat::chat));

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
