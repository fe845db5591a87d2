use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::fetch_json;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{DepthData, PrimaryProvider, ProviderError, ProviderFuture, TickerData};
use crate::{Candle, Decimal, Interval, PriceLevel, ProviderId, Symbol, UtcDateTime};

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Primary provider backed by the Binance public REST API.
#[derive(Clone)]
pub struct BinanceAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for BinanceAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl BinanceAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(BINANCE_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn request(&self, path_and_query: String) -> HttpRequest {
        HttpRequest::get(format!("{}{}", self.base_url, path_and_query))
            .with_timeout_ms(self.timeout_ms)
    }
}

impl PrimaryProvider for BinanceAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Binance
    }

    fn fetch_ticker<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, TickerData> {
        Box::pin(async move {
            let request = self.request(format!(
                "/api/v3/ticker/24hr?symbol={}",
                urlencoding::encode(symbol.as_str())
            ));
            let payload: BinanceTicker =
                fetch_json(self.http_client.as_ref(), ProviderId::Binance, request, "ticker")
                    .await?;
            normalize_ticker(payload)
        })
    }

    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a Symbol,
        interval: Interval,
        limit: u16,
    ) -> ProviderFuture<'a, Vec<Candle>> {
        Box::pin(async move {
            let request = self.request(format!(
                "/api/v3/klines?symbol={}&interval={}&limit={limit}",
                urlencoding::encode(symbol.as_str()),
                interval.as_str()
            ));
            let rows: Vec<Vec<Value>> =
                fetch_json(self.http_client.as_ref(), ProviderId::Binance, request, "klines")
                    .await?;
            rows.iter()
                .enumerate()
                .map(|(index, row)| normalize_kline(index, row))
                .collect()
        })
    }

    fn fetch_depth<'a>(&'a self, symbol: &'a Symbol, limit: u16) -> ProviderFuture<'a, DepthData> {
        Box::pin(async move {
            let request = self.request(format!(
                "/api/v3/depth?symbol={}&limit={limit}",
                urlencoding::encode(symbol.as_str())
            ));
            let payload: BinanceDepth =
                fetch_json(self.http_client.as_ref(), ProviderId::Binance, request, "depth")
                    .await?;
            normalize_depth(payload)
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker {
    symbol: String,
    price_change_percent: String,
    last_price: String,
    high_price: String,
    low_price: String,
    volume: String,
    close_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceDepth {
    last_update_id: u64,
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

fn normalize_ticker(raw: BinanceTicker) -> Result<TickerData, ProviderError> {
    Ok(TickerData {
        symbol: Symbol::parse(&raw.symbol).map_err(|e| decode_error("ticker symbol", e))?,
        last_price: decimal_field("lastPrice", &raw.last_price)?,
        price_change_percent: decimal_field("priceChangePercent", &raw.price_change_percent)?,
        volume: decimal_field("volume", &raw.volume)?,
        high_price: decimal_field("highPrice", &raw.high_price)?,
        low_price: decimal_field("lowPrice", &raw.low_price)?,
        close_time: UtcDateTime::from_unix_millis(raw.close_time)
            .map_err(|e| decode_error("closeTime", e))?,
    })
}

/// Kline rows are mixed arrays:
/// `[openTime, open, high, low, close, volume, closeTime, ...]`.
fn normalize_kline(index: usize, row: &[Value]) -> Result<Candle, ProviderError> {
    if row.len() < 6 {
        return Err(ProviderError::decode(
            ProviderId::Binance,
            format!("kline row {index} has {} fields, expected at least 6", row.len()),
        ));
    }

    let open_time = row[0].as_i64().ok_or_else(|| {
        ProviderError::decode(
            ProviderId::Binance,
            format!("kline row {index} open time is not an integer"),
        )
    })?;

    let text = |position: usize, name: &str| -> Result<Decimal, ProviderError> {
        let raw = row[position].as_str().ok_or_else(|| {
            ProviderError::decode(
                ProviderId::Binance,
                format!("kline row {index} field '{name}' is not a string"),
            )
        })?;
        decimal_field(name, raw)
    };

    Ok(Candle {
        open_time,
        open: text(1, "open")?,
        high: text(2, "high")?,
        low: text(3, "low")?,
        close: text(4, "close")?,
        volume: text(5, "volume")?,
    })
}

fn normalize_depth(raw: BinanceDepth) -> Result<DepthData, ProviderError> {
    let levels = |side: &[[String; 2]], name: &str| -> Result<Vec<PriceLevel>, ProviderError> {
        side.iter()
            .map(|[price, quantity]| {
                Ok(PriceLevel {
                    price: decimal_field(name, price)?,
                    quantity: decimal_field(name, quantity)?,
                })
            })
            .collect()
    };

    Ok(DepthData {
        last_update_id: raw.last_update_id,
        bids: levels(raw.bids.as_slice(), "bids")?,
        asks: levels(raw.asks.as_slice(), "asks")?,
    })
}

fn decimal_field(name: &str, value: &str) -> Result<Decimal, ProviderError> {
    Decimal::parse(value).map_err(|e| decode_error(name, e))
}

fn decode_error(name: &str, error: impl std::fmt::Display) -> ProviderError {
    ProviderError::decode(ProviderId::Binance, format!("field '{name}': {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kline_row_with_numeric_price_is_rejected() {
        let row = vec![
            json!(1_700_000_000_000_i64),
            json!(100.5),
            json!("101.0"),
            json!("99.0"),
            json!("100.0"),
            json!("12.5"),
        ];

        let error = normalize_kline(3, &row).expect_err("numeric price must fail");
        assert!(error.message().contains("row 3"), "{}", error.message());
        assert!(error.message().contains("open"), "{}", error.message());
    }

    #[test]
    fn short_kline_row_is_rejected() {
        let row = vec![json!(1_700_000_000_000_i64), json!("1.0")];
        assert!(normalize_kline(0, &row).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let adapter = BinanceAdapter::default().with_base_url("http://localhost:9000/");
        let request = adapter.request(String::from("/api/v3/depth"));
        assert_eq!(request.url, "http://localhost:9000/api/v3/depth");
    }
}
