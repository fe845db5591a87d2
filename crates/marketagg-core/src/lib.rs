//! # Marketagg Core
//!
//! Market data aggregation for trading pairs: ticker, candlesticks and order
//! book depth, served through a TTL cache with provider fallback.
//!
//! ## Overview
//!
//! - **Canonical domain models** with exact decimal prices and explicit
//!   "unavailable" markers for degraded data
//! - **Provider contracts** for a full-capability primary and a price-only
//!   secondary
//! - **Adapters** for Binance (primary) and CoinGecko (secondary)
//! - **TTL cache** with per-kind freshness windows
//! - **Aggregation service** tying cache, providers and fallback together
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Binance and CoinGecko provider adapters |
//! | [`cache`] | TTL cache store and per-kind cache policy |
//! | [`domain`] | Domain models (TickerQuote, CandleSeries, OrderBookSnapshot) |
//! | [`error`] | Validation and market errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Provider records to canonical responses |
//! | [`provider`] | Primary/secondary provider traits |
//! | [`request`] | Validated requests and cache keys |
//! | [`service`] | Aggregation service |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marketagg_core::{
//!     BinanceAdapter, CachePolicy, CacheStore, CoinGeckoAdapter, MarketService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MarketService::new(
//!         Arc::new(BinanceAdapter::default()),
//!         Arc::new(CoinGeckoAdapter::default()),
//!         CacheStore::new(),
//!         CachePolicy::default(),
//!     );
//!
//!     let quote = service.get_ticker("BTCUSDT").await?;
//!     println!("{} {} ({})", quote.symbol, quote.price, quote.source);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / HTTP     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ MarketService   │────▶│ CacheStore       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Primary /       │────▶│ HTTP Client      │
//! │ Secondary trait │     │ (reqwest/canned) │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use marketagg_core::MarketError;
//!
//! fn status_for(error: &MarketError) -> u16 {
//!     if error.is_caller_error() {
//!         400
//!     } else {
//!         503
//!     }
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod provider;
pub mod request;
pub mod service;
pub mod source;

// Adapter implementations
pub use adapters::{
    coin_id_for, BinanceAdapter, CoinGeckoAdapter, BINANCE_BASE_URL, COINGECKO_BASE_URL,
};

// Caching
pub use cache::{CacheKey, CachePolicy, CacheStore, MAX_TTL};

// Domain models
pub use domain::{
    Candle, CandleSeries, Decimal, Interval, Metric, OrderBookSnapshot, PriceLevel, SourceTag,
    Symbol, TickerQuote, UtcDateTime, UNAVAILABLE_MARKER,
};

// Error types
pub use error::{MarketError, ValidationError};

// HTTP client types
pub use http_client::{
    CannedHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Provider contracts
pub use provider::{
    DepthData, PrimaryProvider, ProviderError, ProviderErrorKind, ProviderFuture,
    SecondaryProvider, TickerData,
};

// Requests
pub use request::{
    DataKind, DepthRequest, KlinesRequest, TickerRequest, DEFAULT_DEPTH_LIMIT,
    DEFAULT_INTERVAL, DEFAULT_KLINES_LIMIT, MAX_DEPTH_LIMIT, MAX_KLINES_LIMIT,
};

pub use service::MarketService;

// Source identifiers
pub use source::ProviderId;
