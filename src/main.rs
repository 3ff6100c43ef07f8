use product_search::{
    api::{build_router, AppState},
    config::Config,
    search::ProductSearchService,
    AppError,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> product_search::Result<()> {
    // Load configuration
    let config = Config::load().map_err(AppError::from).unwrap_or_else(|e| {
        eprintln!("{}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    tracing::info!(
        service = %config.observability.service_name,
        "Starting product search v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = product_search::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
        } else {
            tracing::info!("Prometheus metrics initialized");
        }
    }

    let service = Arc::new(ProductSearchService::with_tantivy(
        config.search.clone(),
        config.backend.clone(),
    ));
    tracing::info!(
        index_root = %config.search.index_root.display(),
        index = %config.search.index_name,
        "Search service initialized"
    );

    if let Err(e) = service.check_ready().await {
        tracing::warn!("Index not ready yet: {}", e);
        tracing::warn!("Searches will fail until `product-indexer rebuild` has run");
    }

    let app = build_router(AppState::new(service)).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Search: POST http://{}/v1/product", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "product_search={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
