mod market;
mod serve;

use std::sync::Arc;

use marketagg_core::{BinanceAdapter, CacheStore, CoinGeckoAdapter, MarketService};
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::settings::Settings;

pub async fn run(cli: &Cli, settings: Settings) -> Result<(), CliError> {
    match &cli.command {
        Command::Serve(args) => serve::run(args, settings).await,
        Command::Ticker(args) => {
            let quote = market::ticker(args, &build_service(&settings)?).await?;
            print_json(&quote, cli.pretty)
        }
        Command::Klines(args) => {
            let series = market::klines(args, &build_service(&settings)?).await?;
            print_json(&series, cli.pretty)
        }
        Command::Depth(args) => {
            let book = market::depth(args, &build_service(&settings)?).await?;
            print_json(&book, cli.pretty)
        }
    }
}

/// Wires the Binance primary, the CoinGecko fallback and a fresh cache from
/// settings.
pub fn build_service(settings: &Settings) -> Result<MarketService, CliError> {
    let policy = settings.cache_policy()?;
    let upstream = &settings.upstream;

    let primary = BinanceAdapter::default()
        .with_base_url(upstream.binance_base_url.as_str())
        .with_timeout_ms(upstream.binance_timeout_ms);
    let secondary = CoinGeckoAdapter::default()
        .with_base_url(upstream.coingecko_base_url.as_str())
        .with_timeout_ms(upstream.coingecko_timeout_ms);

    Ok(MarketService::new(
        Arc::new(primary),
        Arc::new(secondary),
        CacheStore::new(),
        policy,
    ))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
