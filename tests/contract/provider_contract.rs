use std::sync::Arc;

use marketagg_core::{
    BinanceAdapter, CannedHttpClient, CoinGeckoAdapter, HttpResponse, Interval, PrimaryProvider,
    ProviderErrorKind, ProviderId, SecondaryProvider, Symbol,
};

const TICKER_BODY: &str = r#"{
    "symbol": "BTCUSDT",
    "priceChange": "635.21",
    "priceChangePercent": "2.45",
    "lastPrice": "26543.21",
    "highPrice": "27100.00",
    "lowPrice": "26200.00",
    "volume": "45123.67",
    "quoteVolume": "1197654321.12",
    "openTime": 1699913600000,
    "closeTime": 1700000000000,
    "count": 912345
}"#;

const KLINES_BODY: &str = r#"[
    [1700000000000, "26500.00", "26600.00", "26400.00", "26543.21", "120.5", 1700003599999, "3198765.4", 1020, "60.1", "1595000.0", "0"],
    [1700003600000, "26543.21", "26700.00", "26500.00", "26650.00", "98.25", 1700007199999, "2610000.0", 880, "49.0", "1302000.0", "0"]
]"#;

const DEPTH_BODY: &str = r#"{
    "lastUpdateId": 1027024,
    "bids": [["26543.20", "1.500"], ["26543.10", "0.250"]],
    "asks": [["26543.30", "0.800"]]
}"#;

fn btc() -> Symbol {
    Symbol::parse("BTCUSDT").expect("valid symbol")
}

fn binance(response: HttpResponse) -> (BinanceAdapter, Arc<CannedHttpClient>) {
    let http = Arc::new(CannedHttpClient::respond(response));
    let adapter = BinanceAdapter::with_http_client(http.clone())
        .with_base_url("http://binance.test")
        .with_timeout_ms(2_500);
    (adapter, http)
}

fn coingecko(response: HttpResponse) -> (CoinGeckoAdapter, Arc<CannedHttpClient>) {
    let http = Arc::new(CannedHttpClient::respond(response));
    let adapter =
        CoinGeckoAdapter::with_http_client(http.clone()).with_base_url("http://coingecko.test");
    (adapter, http)
}

#[tokio::test]
async fn binance_ticker_is_normalised_from_decimal_strings() {
    let (adapter, http) = binance(HttpResponse::ok_json(TICKER_BODY));

    let ticker = adapter.fetch_ticker(&btc()).await.expect("ticker");

    assert_eq!(ticker.symbol.as_str(), "BTCUSDT");
    assert_eq!(ticker.last_price.to_string(), "26543.21");
    assert_eq!(ticker.price_change_percent.to_string(), "2.45");
    assert_eq!(ticker.volume.to_string(), "45123.67");
    assert_eq!(ticker.high_price.to_string(), "27100.00");
    assert_eq!(ticker.low_price.to_string(), "26200.00");
    assert_eq!(ticker.close_time.unix_timestamp(), 1_700_000_000);

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "http://binance.test/api/v3/ticker/24hr?symbol=BTCUSDT"
    );
    assert_eq!(requests[0].timeout_ms, 2_500);
    assert_eq!(
        requests[0].headers.get("accept").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn binance_klines_convert_mixed_rows_in_order() {
    let (adapter, http) = binance(HttpResponse::ok_json(KLINES_BODY));

    let candles = adapter
        .fetch_candles(&btc(), Interval::OneHour, 2)
        .await
        .expect("candles");

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].open_time, 1_700_000_000_000);
    assert_eq!(candles[0].close.to_string(), "26543.21");
    assert_eq!(candles[1].open_time, 1_700_003_600_000);
    assert_eq!(candles[1].volume.to_string(), "98.25");
    assert_eq!(
        http.requests()[0].url,
        "http://binance.test/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=2"
    );
}

#[tokio::test]
async fn binance_depth_keeps_level_order() {
    let (adapter, http) = binance(HttpResponse::ok_json(DEPTH_BODY));

    let depth = adapter.fetch_depth(&btc(), 5).await.expect("depth");

    assert_eq!(depth.last_update_id, 1_027_024);
    let bids: Vec<String> = depth.bids.iter().map(|level| level.price.to_string()).collect();
    assert_eq!(bids, ["26543.20", "26543.10"]);
    assert_eq!(depth.asks[0].quantity.to_string(), "0.800");
    assert_eq!(
        http.requests()[0].url,
        "http://binance.test/api/v3/depth?symbol=BTCUSDT&limit=5"
    );
}

#[tokio::test]
async fn binance_non_success_status_is_reported_with_body() {
    let (adapter, _) = binance(HttpResponse::new(
        400,
        r#"{"code":-1121,"msg":"Invalid symbol."}"#,
    ));

    let error = adapter.fetch_ticker(&btc()).await.expect_err("status 400");

    assert_eq!(error.provider(), ProviderId::Binance);
    assert_eq!(error.kind(), ProviderErrorKind::Status);
    assert!(error.message().contains("400"), "{}", error.message());
    assert!(error.message().contains("Invalid symbol."), "{}", error.message());
}

#[tokio::test]
async fn binance_malformed_payload_is_a_decode_error() {
    let (adapter, _) = binance(HttpResponse::ok_json(r#"{"symbol":"BTCUSDT"}"#));

    let error = adapter.fetch_ticker(&btc()).await.expect_err("missing fields");
    assert_eq!(error.kind(), ProviderErrorKind::Decode);
}

#[tokio::test]
async fn binance_transport_failure_is_reported() {
    let http = Arc::new(CannedHttpClient::fail("connection refused"));
    let adapter = BinanceAdapter::with_http_client(http);

    let error = adapter.fetch_depth(&btc(), 20).await.expect_err("offline");
    assert_eq!(error.kind(), ProviderErrorKind::Transport);
    assert!(error.to_string().contains("connection refused"));
}

#[tokio::test]
async fn coingecko_maps_pair_to_coin_id_and_returns_price() {
    let (adapter, http) = coingecko(HttpResponse::ok_json(r#"{"bitcoin":{"usd":26543.21}}"#));

    let price = adapter.fetch_spot_price(&btc()).await.expect("price");

    assert_eq!(price.to_string(), "26543.21");
    assert_eq!(
        http.requests()[0].url,
        "http://coingecko.test/simple/price?ids=bitcoin&vs_currencies=usd"
    );
}

#[tokio::test]
async fn coingecko_small_prices_stay_exact() {
    let (adapter, _) = coingecko(HttpResponse::ok_json(r#"{"ripple":{"usd":1.2e-7}}"#));

    let price = adapter
        .fetch_spot_price(&Symbol::parse("XRPUSDT").expect("valid symbol"))
        .await
        .expect("price");

    assert_eq!(price.to_string(), "0.00000012");
}

#[tokio::test]
async fn coingecko_unmapped_symbol_fails_without_a_request() {
    let (adapter, http) = coingecko(HttpResponse::ok_json("{}"));

    let error = adapter
        .fetch_spot_price(&Symbol::parse("FOOUSDT").expect("valid symbol"))
        .await
        .expect_err("unmapped");

    assert_eq!(error.kind(), ProviderErrorKind::UnsupportedSymbol);
    assert_eq!(error.message(), "unsupported symbol: FOOUSDT");
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn coingecko_missing_coin_in_response_is_a_decode_error() {
    let (adapter, _) = coingecko(HttpResponse::ok_json(r#"{"ethereum":{"usd":1800.5}}"#));

    let error = adapter.fetch_spot_price(&btc()).await.expect_err("no bitcoin");

    assert_eq!(error.kind(), ProviderErrorKind::Decode);
    assert!(error.message().contains("price not found for bitcoin"));
}

#[test]
fn adapters_report_their_identity() {
    assert_eq!(PrimaryProvider::id(&BinanceAdapter::default()), ProviderId::Binance);
    assert_eq!(
        SecondaryProvider::id(&CoinGeckoAdapter::default()),
        ProviderId::Coingecko
    );
}
