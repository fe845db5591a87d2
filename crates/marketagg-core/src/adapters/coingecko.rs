use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Number;

use super::fetch_json;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{ProviderError, ProviderFuture, SecondaryProvider};
use crate::{Decimal, ProviderId, Symbol};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Quote assets stripped from a trading pair before the coin lookup.
const QUOTE_SUFFIXES: [&str; 2] = ["USDT", "BUSD"];

/// Base asset ticker (lowercase) to CoinGecko coin id.
const COIN_IDS: [(&str, &str); 22] = [
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("bnb", "binancecoin"),
    ("ada", "cardano"),
    ("dot", "polkadot"),
    ("link", "chainlink"),
    ("ltc", "litecoin"),
    ("xrp", "ripple"),
    ("sol", "solana"),
    ("matic", "matic-network"),
    ("avax", "avalanche-2"),
    ("atom", "cosmos"),
    ("near", "near"),
    ("ftm", "fantom"),
    ("algo", "algorand"),
    ("vet", "vechain"),
    ("icp", "internet-computer"),
    ("fil", "filecoin"),
    ("trx", "tron"),
    ("xlm", "stellar"),
    ("aave", "aave"),
    ("uni", "uniswap"),
];

/// Maps a trading pair such as `BTCUSDT` to its CoinGecko coin id.
pub fn coin_id_for(symbol: &Symbol) -> Option<&'static str> {
    let upper = symbol.as_str().to_ascii_uppercase();
    let mut base = upper.as_str();
    for suffix in QUOTE_SUFFIXES {
        base = base.strip_suffix(suffix).unwrap_or(base);
    }
    let base = base.to_ascii_lowercase();

    COIN_IDS
        .iter()
        .find(|(ticker, _)| *ticker == base)
        .map(|(_, id)| *id)
}

/// Secondary provider backed by the CoinGecko simple price endpoint.
#[derive(Clone)]
pub struct CoinGeckoAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for CoinGeckoAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl CoinGeckoAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(COINGECKO_BASE_URL),
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
}

impl SecondaryProvider for CoinGeckoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Coingecko
    }

    fn fetch_spot_price<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Decimal> {
        Box::pin(async move {
            let Some(coin_id) = coin_id_for(symbol) else {
                return Err(ProviderError::unsupported_symbol(
                    ProviderId::Coingecko,
                    symbol.as_str(),
                ));
            };

            let request = HttpRequest::get(format!(
                "{}/simple/price?ids={}&vs_currencies=usd",
                self.base_url,
                urlencoding::encode(coin_id)
            ))
            .with_timeout_ms(self.timeout_ms);

            // {"bitcoin": {"usd": 26543.21}}
            let mut prices: HashMap<String, CoinGeckoPrice> =
                fetch_json(self.http_client.as_ref(), ProviderId::Coingecko, request, "price")
                    .await?;

            let price = prices.remove(coin_id).ok_or_else(|| {
                ProviderError::decode(
                    ProviderId::Coingecko,
                    format!("price not found for {coin_id}"),
                )
            })?;

            Decimal::from_number_text(&price.usd.to_string()).map_err(|error| {
                ProviderError::decode(ProviderId::Coingecko, format!("field 'usd': {error}"))
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct CoinGeckoPrice {
    usd: Number,
}
