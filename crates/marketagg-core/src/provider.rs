//! Provider capability contracts.
//!
//! The aggregation service is written against two narrow roles rather than
//! concrete vendors:
//!
//! | Role | Trait | Capabilities |
//! |------|-------|--------------|
//! | Primary | [`PrimaryProvider`] | ticker, candles, depth at full fidelity |
//! | Secondary | [`SecondaryProvider`] | spot price only, ticker fallback |
//!
//! Adapters normalise upstream payloads into the typed records below before
//! returning, so nothing loosely typed crosses into the service. Every
//! failure (network, status, decode, unknown symbol) is reported as a single
//! [`ProviderError`]; the service treats all kinds the same way.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Candle, Decimal, Interval, PriceLevel, ProviderId, Symbol, UtcDateTime};

/// Longest upstream body excerpt kept in a status error message.
const MAX_BODY_EXCERPT: usize = 256;

/// 24h statistics as reported by a primary provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerData {
    pub symbol: Symbol,
    pub last_price: Decimal,
    pub price_change_percent: Decimal,
    pub volume: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub close_time: UtcDateTime,
}

/// Order book levels as reported by a primary provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthData {
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// Provider failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Transport,
    Status,
    Decode,
    UnsupportedSymbol,
}

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    provider: ProviderId,
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn transport(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn status(provider: ProviderId, status: u16, body: &str) -> Self {
        let excerpt: String = body.trim().chars().take(MAX_BODY_EXCERPT).collect();
        Self {
            provider,
            kind: ProviderErrorKind::Status,
            message: format!("{provider} API error: {status} - {excerpt}"),
        }
    }

    pub fn decode(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::Decode,
            message: message.into(),
        }
    }

    pub fn unsupported_symbol(provider: ProviderId, symbol: &str) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::UnsupportedSymbol,
            message: format!("unsupported symbol: {symbol}"),
        }
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.message)
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Full-capability provider.
///
/// Implementations enforce their own per-call timeout and must be
/// `Send + Sync`; one instance serves all concurrent requests.
pub trait PrimaryProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn fetch_ticker<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, TickerData>;

    /// Candles in chronological order.
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a Symbol,
        interval: Interval,
        limit: u16,
    ) -> ProviderFuture<'a, Vec<Candle>>;

    fn fetch_depth<'a>(&'a self, symbol: &'a Symbol, limit: u16) -> ProviderFuture<'a, DepthData>;
}

/// Price-only provider, consulted solely as a ticker fallback.
pub trait SecondaryProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn fetch_spot_price<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Decimal>;
}
