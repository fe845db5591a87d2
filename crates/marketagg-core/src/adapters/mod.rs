mod binance;
mod coingecko;

pub use binance::{BinanceAdapter, BINANCE_BASE_URL};
pub use coingecko::{coin_id_for, CoinGeckoAdapter, COINGECKO_BASE_URL};

use serde::de::DeserializeOwned;

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::ProviderError;
use crate::ProviderId;

/// Executes a GET and decodes a successful JSON body.
///
/// Transport failures, non-2xx statuses and decode failures all surface as a
/// single [`ProviderError`].
async fn fetch_json<T>(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
    what: &str,
) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
{
    let response = http_client
        .execute(request.with_header("accept", "application/json"))
        .await
        .map_err(|error| {
            ProviderError::transport(provider, format!("failed to fetch {what}: {error}"))
        })?;

    if !response.is_success() {
        return Err(ProviderError::status(
            provider,
            response.status,
            &response.body,
        ));
    }

    serde_json::from_str(&response.body).map_err(|error| {
        ProviderError::decode(provider, format!("failed to decode {what} response: {error}"))
    })
}
