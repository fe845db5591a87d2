//! CLI argument definitions for marketagg.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the HTTP market data API |
//! | `ticker` | Fetch one ticker and print it as JSON |
//! | `klines` | Fetch candlesticks and print them as JSON |
//! | `depth` | Fetch an order book snapshot and print it as JSON |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `marketagg.toml` if present | Settings file |
//! | `--log-level` | `info` | Log filter when `RUST_LOG` is unset |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! marketagg serve --port 8081
//! marketagg ticker BTCUSDT --pretty
//! marketagg klines ETHUSDT --interval 15m --limit 50
//! marketagg depth BTCUSDT --limit 10
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use marketagg_core::{DEFAULT_DEPTH_LIMIT, DEFAULT_INTERVAL, DEFAULT_KLINES_LIMIT};

/// Market data aggregation with caching and provider fallback.
#[derive(Debug, Parser)]
#[command(
    name = "marketagg",
    author,
    version,
    about = "Market data aggregation with caching and provider fallback"
)]
pub struct Cli {
    /// Settings file (TOML). Environment variables prefixed with
    /// `MARKETAGG__` override file values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    ///
    /// # Examples
    ///
    ///   marketagg serve
    ///   marketagg serve --host 127.0.0.1 --port 8081
    Serve(ServeArgs),

    /// Fetch the rolling 24h ticker for a symbol.
    ///
    /// Falls back to a price-only quote when the primary provider fails.
    Ticker(TickerArgs),

    /// Fetch OHLCV candlesticks.
    Klines(KlinesArgs),

    /// Fetch an order book snapshot.
    Depth(DepthArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind, overriding `server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding `server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct TickerArgs {
    /// Trading pair, e.g. BTCUSDT.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct KlinesArgs {
    /// Trading pair, e.g. BTCUSDT.
    pub symbol: String,

    /// Candle interval: 1m 3m 5m 15m 30m 1h 2h 4h 6h 8h 12h 1d 3d 1w 1M.
    #[arg(long, default_value = DEFAULT_INTERVAL.as_str())]
    pub interval: String,

    /// Number of candles, 1 to 1000.
    #[arg(long, default_value_t = i64::from(DEFAULT_KLINES_LIMIT), allow_negative_numbers = true)]
    pub limit: i64,
}

#[derive(Debug, Args)]
pub struct DepthArgs {
    /// Trading pair, e.g. BTCUSDT.
    pub symbol: String,

    /// Levels per side, 1 to 100.
    #[arg(long, default_value_t = i64::from(DEFAULT_DEPTH_LIMIT), allow_negative_numbers = true)]
    pub limit: i64,
}
