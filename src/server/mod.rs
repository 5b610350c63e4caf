pub mod handlers;
pub mod types;

use crate::{
    Error, Result,
    config::{Config, CorsConfig},
    llm::OpenAiVisionClient,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Uploads and base64 bodies larger than this are rejected with 413.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub async fn run(config: Config) -> Result<()> {
    // Provider client is built once and shared read-only by all handlers
    let client = OpenAiVisionClient::new(&config.llm)?;
    info!(
        "Using model '{}' at {}",
        client.model(),
        client.endpoint()
    );

    let app_state = AppState::new(Arc::new(client));
    let app = build_router(app_state, &config.server.cors)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Result<Router> {
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/grade-kanji", post(handlers::grade_kanji))
        .route("/grade-katakana", post(handlers::grade_katakana))
        .route("/grade-hiragana", post(handlers::grade_hiragana))
        .route("/classify", post(handlers::classify_image))
        .route("/classify_url", post(handlers::classify_url))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors)?)
        .with_state(state);

    Ok(app)
}

/// `*` in the allow-list admits any origin by echoing it back, which keeps
/// credentialed requests valid.
fn cors_layer(cors: &CorsConfig) -> Result<CorsLayer> {
    let allow_origin = if cors.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(parse_origins(&cors.allowed_origins)?)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

fn parse_origins(origins: &[String]) -> Result<Vec<HeaderValue>> {
    origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::config(format!("Invalid CORS origin: '{}'", origin)))
        })
        .collect()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
