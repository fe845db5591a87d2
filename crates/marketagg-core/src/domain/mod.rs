//! # Domain Models
//!
//! Canonical market data types returned by the aggregation service.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Case-preserved trading pair key |
//! | [`Interval`] | Candle granularity (1m .. 1M) |
//! | [`Decimal`] | Exact decimal with upstream scale, serialised as a string |
//! | [`Metric`] | 24h figure or explicit "unavailable" |
//! | [`TickerQuote`] | Rolling 24h snapshot |
//! | [`CandleSeries`] | Ordered OHLCV candles |
//! | [`OrderBookSnapshot`] | Bid/ask levels capped at a depth |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Prices and quantities are never represented as floats. Every numeric
//! market figure is a [`Decimal`] that keeps the upstream scale.

mod decimal;
mod interval;
mod models;
mod symbol;
mod timestamp;

pub use decimal::{Decimal, Metric, UNAVAILABLE_MARKER};
pub use interval::Interval;
pub use models::{
    Candle, CandleSeries, OrderBookSnapshot, PriceLevel, SourceTag, TickerQuote,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
