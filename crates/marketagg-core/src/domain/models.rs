use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Decimal, Interval, Metric, Symbol, UtcDateTime};

/// Which provider role produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Primary,
    SecondaryFallback,
}

impl SourceTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::SecondaryFallback => "secondary_fallback",
        }
    }
}

impl Display for SourceTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical rolling 24h snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerQuote {
    pub symbol: Symbol,
    pub price: Decimal,
    #[serde(rename = "change24h")]
    pub change_24h: Metric,
    #[serde(rename = "volume24h")]
    pub volume_24h: Metric,
    #[serde(rename = "high24h")]
    pub high_24h: Metric,
    #[serde(rename = "low24h")]
    pub low_24h: Metric,
    pub source: SourceTag,
    /// When this quote was assembled.
    pub timestamp: UtcDateTime,
    /// Last update reported by the upstream.
    pub last_update: UtcDateTime,
}

impl TickerQuote {
    /// `true` when only the spot price is known.
    pub fn is_degraded(&self) -> bool {
        self.source == SourceTag::SecondaryFallback
    }
}

/// One OHLCV bucket. `open_time` is epoch milliseconds as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Candles in provider-supplied chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: Symbol,
    pub interval: Interval,
    pub candles: Vec<Candle>,
    pub source: SourceTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Order book capped at the requested depth.
///
/// Bids are ordered by descending price and asks by ascending price, as
/// supplied by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub source: SourceTag,
    pub timestamp: UtcDateTime,
}
