//! Aggregation service: cache lookup, primary fetch, ticker fallback and
//! cache population for each data kind.
//!
//! | Kind | Providers consulted | TTL on success |
//! |------|---------------------|----------------|
//! | Ticker | primary, then secondary on failure | `ticker` / `ticker_fallback` |
//! | Klines | primary only | `klines` |
//! | Depth | primary only | `depth` |
//!
//! Concurrent misses on the same key are not coalesced: each one calls the
//! provider and the last write wins.

use std::sync::Arc;

use tracing::instrument;

use crate::cache::{CachePolicy, CacheStore};
use crate::error::MarketError;
use crate::normalize;
use crate::provider::{PrimaryProvider, SecondaryProvider};
use crate::request::{DepthRequest, KlinesRequest, TickerRequest};
use crate::{CandleSeries, OrderBookSnapshot, TickerQuote, UtcDateTime};

/// Market data facade over injected providers and cache.
///
/// Cloning shares the providers and the cache.
#[derive(Clone)]
pub struct MarketService {
    primary: Arc<dyn PrimaryProvider>,
    secondary: Arc<dyn SecondaryProvider>,
    cache: CacheStore,
    policy: CachePolicy,
}

impl std::fmt::Debug for MarketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketService")
            .field("primary", &self.primary.id())
            .field("secondary", &self.secondary.id())
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish()
    }
}

impl MarketService {
    pub fn new(
        primary: Arc<dyn PrimaryProvider>,
        secondary: Arc<dyn SecondaryProvider>,
        cache: CacheStore,
        policy: CachePolicy,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Validates `symbol` and returns its ticker.
    pub async fn get_ticker(&self, symbol: &str) -> Result<TickerQuote, MarketError> {
        let request = TickerRequest::new(symbol)?;
        self.ticker(&request).await
    }

    /// Validates the raw parameters and returns the candle series.
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: i64,
    ) -> Result<CandleSeries, MarketError> {
        let request = KlinesRequest::new(symbol, interval, limit)?;
        self.klines(&request).await
    }

    /// Validates the raw parameters and returns the order book.
    pub async fn get_depth(&self, symbol: &str, limit: i64) -> Result<OrderBookSnapshot, MarketError> {
        let request = DepthRequest::new(symbol, limit)?;
        self.depth(&request).await
    }

    #[instrument(skip_all, fields(symbol = %request.symbol))]
    pub async fn ticker(&self, request: &TickerRequest) -> Result<TickerQuote, MarketError> {
        let key = request.cache_key();
        if let Some(quote) = self.cache.get::<TickerQuote>(&key) {
            tracing::debug!(key = %key, source = %quote.source, "cache hit");
            return Ok(quote);
        }

        let primary_error = match self.primary.fetch_ticker(&request.symbol).await {
            Ok(data) => {
                let quote = normalize::ticker_from_primary(data, UtcDateTime::now());
                self.cache.set(key, quote.clone(), self.policy.ticker);
                tracing::info!(provider = %self.primary.id(), source = %quote.source, "fetched ticker");
                return Ok(quote);
            }
            Err(error) => error,
        };

        tracing::warn!(
            provider = %self.primary.id(),
            error = %primary_error,
            "primary ticker failed, falling back to secondary"
        );

        match self.secondary.fetch_spot_price(&request.symbol).await {
            Ok(price) => {
                let quote =
                    normalize::ticker_from_fallback(request.symbol.clone(), price, UtcDateTime::now());
                self.cache.set(key, quote.clone(), self.policy.ticker_fallback);
                tracing::info!(provider = %self.secondary.id(), source = %quote.source, "fetched ticker");
                Ok(quote)
            }
            Err(secondary_error) => {
                tracing::error!(
                    primary = %primary_error,
                    secondary = %secondary_error,
                    "all ticker providers failed"
                );
                Err(MarketError::TickerUnavailable {
                    primary: primary_error,
                    secondary: secondary_error,
                })
            }
        }
    }

    #[instrument(skip_all, fields(symbol = %request.symbol, interval = %request.interval, limit = request.limit))]
    pub async fn klines(&self, request: &KlinesRequest) -> Result<CandleSeries, MarketError> {
        let key = request.cache_key();
        if let Some(series) = self.cache.get::<CandleSeries>(&key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(series);
        }

        let candles = self
            .primary
            .fetch_candles(&request.symbol, request.interval, request.limit)
            .await
            .map_err(|error| {
                tracing::error!(provider = %self.primary.id(), error = %error, "klines fetch failed");
                MarketError::KlinesUnavailable(error)
            })?;

        let series = normalize::candle_series(request, candles);
        self.cache.set(key, series.clone(), self.policy.klines);
        tracing::info!(provider = %self.primary.id(), candles = series.candles.len(), "fetched klines");
        Ok(series)
    }

    #[instrument(skip_all, fields(symbol = %request.symbol, limit = request.limit))]
    pub async fn depth(&self, request: &DepthRequest) -> Result<OrderBookSnapshot, MarketError> {
        let key = request.cache_key();
        if let Some(book) = self.cache.get::<OrderBookSnapshot>(&key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(book);
        }

        let data = self
            .primary
            .fetch_depth(&request.symbol, request.limit)
            .await
            .map_err(|error| {
                tracing::error!(provider = %self.primary.id(), error = %error, "depth fetch failed");
                MarketError::DepthUnavailable(error)
            })?;

        let book = normalize::order_book(request, data, UtcDateTime::now());
        self.cache.set(key, book.clone(), self.policy.depth);
        tracing::info!(
            provider = %self.primary.id(),
            bids = book.bids.len(),
            asks = book.asks.len(),
            "fetched depth"
        );
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::provider::{DepthData, ProviderError, ProviderFuture, TickerData};
    use crate::{Candle, Decimal, Interval, ProviderId, Symbol};

    struct DownPrimary {
        calls: AtomicUsize,
    }

    impl PrimaryProvider for DownPrimary {
        fn id(&self) -> ProviderId {
            ProviderId::Binance
        }

        fn fetch_ticker<'a>(&'a self, _symbol: &'a Symbol) -> ProviderFuture<'a, TickerData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Err(ProviderError::transport(
                    ProviderId::Binance,
                    "connection refused",
                ))
            })
        }

        fn fetch_candles<'a>(
            &'a self,
            _symbol: &'a Symbol,
            _interval: Interval,
            _limit: u16,
        ) -> ProviderFuture<'a, Vec<Candle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(ProviderError::status(ProviderId::Binance, 500, "")) })
        }

        fn fetch_depth<'a>(&'a self, _symbol: &'a Symbol, _limit: u16) -> ProviderFuture<'a, DepthData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(ProviderError::status(ProviderId::Binance, 500, "")) })
        }
    }

    struct FixedSecondary;

    impl SecondaryProvider for FixedSecondary {
        fn id(&self) -> ProviderId {
            ProviderId::Coingecko
        }

        fn fetch_spot_price<'a>(&'a self, _symbol: &'a Symbol) -> ProviderFuture<'a, Decimal> {
            Box::pin(async {
                Decimal::parse("26543.21")
                    .map_err(|e| ProviderError::decode(ProviderId::Coingecko, e.to_string()))
            })
        }
    }

    fn service(primary: Arc<DownPrimary>) -> MarketService {
        MarketService::new(
            primary,
            Arc::new(FixedSecondary),
            CacheStore::new(),
            CachePolicy::default(),
        )
    }

    #[tokio::test]
    async fn fallback_quote_is_cached_with_the_fallback_ttl() {
        let primary = Arc::new(DownPrimary {
            calls: AtomicUsize::new(0),
        });
        let service = service(Arc::clone(&primary));

        let quote = service.get_ticker("BTCUSDT").await.expect("fallback quote");
        assert!(quote.is_degraded());

        let again = service.get_ticker("BTCUSDT").await.expect("cached quote");
        assert_eq!(again, quote);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn depth_failure_maps_to_depth_unavailable() {
        let service = service(Arc::new(DownPrimary {
            calls: AtomicUsize::new(0),
        }));

        let error = service.get_depth("BTCUSDT", 20).await.expect_err("primary is down");
        assert_eq!(error.code(), "DEPTH_UNAVAILABLE");
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn invalid_symbol_fails_before_any_provider_call() {
        let primary = Arc::new(DownPrimary {
            calls: AtomicUsize::new(0),
        });
        let service = service(Arc::clone(&primary));

        let error = service.get_ticker("   ").await.expect_err("empty symbol");
        assert_eq!(error.code(), "MISSING_SYMBOL");
        assert!(error.is_caller_error());
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
    }
}
