//! HTTP surface for the market data service.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /public/market/ticker?symbol=S` | `TickerQuote` |
//! | `GET /public/market/klines?symbol=S&interval=I&limit=N` | `CandleSeries` |
//! | `GET /public/market/depth?symbol=S&limit=N` | `OrderBookSnapshot` |
//! | `GET /health` | service status and uptime |
//!
//! Caller errors answer 400 and provider failures 503, both with the
//! `{error, code, request_id, timestamp}` body.

mod error;
mod handlers;
mod request_id;

use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Router};
use marketagg_core::MarketService;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::CliError;
use crate::settings::{ServiceSettings, Settings};

use self::request_id::REQUEST_ID_HEADER;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: MarketService,
    pub service_name: Arc<str>,
    pub version: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: MarketService, settings: &ServiceSettings) -> Self {
        Self {
            service,
            service_name: Arc::from(settings.name.as_str()),
            version: Arc::from(settings.version.as_str()),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/public/market/ticker", get(handlers::ticker))
        .route("/public/market/klines", get(handlers::klines))
        .route("/public/market/depth", get(handlers::depth))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(request_id::propagate))
        .with_state(state)
}

/// `*` or an empty list allows any origin; otherwise only the listed ones.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, CliError> {
    let allow_origin = if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let parsed = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim()).map_err(|error| CliError::InvalidSetting {
                    key: "server.cors_origins",
                    reason: format!("'{origin}': {error}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, REQUEST_ID_HEADER])
        .expose_headers([REQUEST_ID_HEADER]))
}

/// Binds, serves until Ctrl-C or SIGTERM, then stops the cache sweeper.
pub async fn serve(service: MarketService, settings: &Settings) -> Result<(), CliError> {
    let cors = cors_layer(&settings.server.cors_origins)?;
    let sweeper = settings
        .sweep_period()
        .map(|period| service.cache().spawn_sweeper(period));

    let app = router(AppState::new(service, &settings.service), cors);

    let listener =
        tokio::net::TcpListener::bind((settings.server.host.as_str(), settings.server.port))
            .await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        service = %settings.service.name,
        version = %settings.service.version,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
