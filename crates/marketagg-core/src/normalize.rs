//! Conversion of provider records into canonical responses.

use crate::provider::{DepthData, TickerData};
use crate::request::{DepthRequest, KlinesRequest};
use crate::{
    Candle, CandleSeries, Decimal, Metric, OrderBookSnapshot, SourceTag, Symbol, TickerQuote,
    UtcDateTime,
};

pub fn ticker_from_primary(data: TickerData, assembled_at: UtcDateTime) -> TickerQuote {
    TickerQuote {
        symbol: data.symbol,
        price: data.last_price,
        change_24h: Metric::Value(data.price_change_percent),
        volume_24h: Metric::Value(data.volume),
        high_24h: Metric::Value(data.high_price),
        low_24h: Metric::Value(data.low_price),
        source: SourceTag::Primary,
        timestamp: assembled_at,
        last_update: data.close_time,
    }
}

/// Degraded quote from a spot price alone. The 24h figures are explicitly
/// unavailable and the upstream update time is the assembly time.
pub fn ticker_from_fallback(
    symbol: Symbol,
    price: Decimal,
    assembled_at: UtcDateTime,
) -> TickerQuote {
    TickerQuote {
        symbol,
        price,
        change_24h: Metric::Unavailable,
        volume_24h: Metric::Unavailable,
        high_24h: Metric::Unavailable,
        low_24h: Metric::Unavailable,
        source: SourceTag::SecondaryFallback,
        timestamp: assembled_at,
        last_update: assembled_at,
    }
}

pub fn candle_series(request: &KlinesRequest, candles: Vec<Candle>) -> CandleSeries {
    CandleSeries {
        symbol: request.symbol.clone(),
        interval: request.interval,
        candles,
        source: SourceTag::Primary,
    }
}

/// Each side keeps provider order and is capped at the requested limit.
pub fn order_book(
    request: &DepthRequest,
    mut data: DepthData,
    assembled_at: UtcDateTime,
) -> OrderBookSnapshot {
    let limit = usize::from(request.limit);
    data.bids.truncate(limit);
    data.asks.truncate(limit);

    OrderBookSnapshot {
        symbol: request.symbol.clone(),
        bids: data.bids,
        asks: data.asks,
        source: SourceTag::Primary,
        timestamp: assembled_at,
    }
}
