use marketagg_core::{CandleSeries, MarketService, OrderBookSnapshot, TickerQuote};

use crate::cli::{DepthArgs, KlinesArgs, TickerArgs};
use crate::error::CliError;

pub async fn ticker(args: &TickerArgs, service: &MarketService) -> Result<TickerQuote, CliError> {
    let quote = service.get_ticker(&args.symbol).await?;
    if quote.is_degraded() {
        tracing::warn!(symbol = %quote.symbol, "primary provider unavailable, 24h figures are N/A");
    }
    Ok(quote)
}

pub async fn klines(args: &KlinesArgs, service: &MarketService) -> Result<CandleSeries, CliError> {
    Ok(service
        .get_klines(&args.symbol, &args.interval, args.limit)
        .await?)
}

pub async fn depth(args: &DepthArgs, service: &MarketService) -> Result<OrderBookSnapshot, CliError> {
    Ok(service.get_depth(&args.symbol, args.limit).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use marketagg_core::{
        BinanceAdapter, CachePolicy, CacheStore, CannedHttpClient, CoinGeckoAdapter,
        HttpResponse, SourceTag,
    };

    use super::*;

    fn service(primary: CannedHttpClient, secondary: CannedHttpClient) -> MarketService {
        MarketService::new(
            Arc::new(BinanceAdapter::with_http_client(Arc::new(primary))),
            Arc::new(CoinGeckoAdapter::with_http_client(Arc::new(secondary))),
            CacheStore::new(),
            CachePolicy::default(),
        )
    }

    #[tokio::test]
    async fn ticker_command_reports_degraded_quotes() {
        let service = service(
            CannedHttpClient::fail("connection refused"),
            CannedHttpClient::respond(HttpResponse::ok_json(r#"{"ethereum":{"usd":1850.25}}"#)),
        );
        let args = TickerArgs {
            symbol: String::from("ETHUSDT"),
        };

        let quote = ticker(&args, &service).await.expect("fallback quote");

        assert_eq!(quote.source, SourceTag::SecondaryFallback);
        assert_eq!(quote.price.to_string(), "1850.25");
    }

    #[tokio::test]
    async fn depth_command_surfaces_caller_errors() {
        let service = service(
            CannedHttpClient::fail("unused"),
            CannedHttpClient::fail("unused"),
        );
        let args = DepthArgs {
            symbol: String::from("BTCUSDT"),
            limit: 0,
        };

        let error = depth(&args, &service).await.expect_err("limit 0");
        assert_eq!(error.exit_code(), 2);
    }
}
