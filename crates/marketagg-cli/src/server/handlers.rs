use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use marketagg_core::{
    CandleSeries, OrderBookSnapshot, TickerQuote, UtcDateTime, DEFAULT_DEPTH_LIMIT,
    DEFAULT_INTERVAL, DEFAULT_KLINES_LIMIT,
};
use serde::Serialize;

use super::error::ApiError;
use super::request_id::RequestId;
use super::AppState;

/// Query parameters are collected as raw pairs so that malformed or
/// repeated values map to stable error codes instead of extractor
/// rejections.
#[derive(Debug, Default)]
pub struct MarketQuery {
    symbol: Option<String>,
    interval: Option<String>,
    limit: Option<String>,
}

type RawPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

impl MarketQuery {
    fn from_request(raw: RawPairs, request_id: &RequestId) -> Result<Self, ApiError> {
        let Query(pairs) =
            raw.map_err(|rejection| ApiError::malformed_query(&rejection, request_id.clone()))?;

        let mut query = Self::default();
        for (name, value) in pairs {
            let (slot, code) = match name.as_str() {
                "symbol" => (&mut query.symbol, "INVALID_SYMBOL"),
                "interval" => (&mut query.interval, "INVALID_INTERVAL"),
                "limit" => (&mut query.limit, "INVALID_LIMIT"),
                _ => continue,
            };
            if slot.is_some() {
                return Err(ApiError::repeated_parameter(code, &name, request_id.clone()));
            }
            *slot = Some(value);
        }
        Ok(query)
    }

    fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or_default()
    }

    fn limit(&self, default: u16, request_id: &RequestId) -> Result<i64, ApiError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(i64::from(default)),
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::invalid_limit(raw, request_id.clone())),
        }
    }
}

pub async fn ticker(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw: RawPairs,
) -> Result<Json<TickerQuote>, ApiError> {
    let query = MarketQuery::from_request(raw, &request_id)?;
    state
        .service
        .get_ticker(query.symbol())
        .await
        .map(Json)
        .map_err(|error| ApiError::market(error, request_id))
}

pub async fn klines(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw: RawPairs,
) -> Result<Json<CandleSeries>, ApiError> {
    let query = MarketQuery::from_request(raw, &request_id)?;
    let limit = query.limit(DEFAULT_KLINES_LIMIT, &request_id)?;
    let interval = query
        .interval
        .as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_INTERVAL.as_str());

    state
        .service
        .get_klines(query.symbol(), interval, limit)
        .await
        .map(Json)
        .map_err(|error| ApiError::market(error, request_id))
}

pub async fn depth(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    raw: RawPairs,
) -> Result<Json<OrderBookSnapshot>, ApiError> {
    let query = MarketQuery::from_request(raw, &request_id)?;
    let limit = query.limit(DEFAULT_DEPTH_LIMIT, &request_id)?;

    state
        .service
        .get_depth(query.symbol(), limit)
        .await
        .map(Json)
        .map_err(|error| ApiError::market(error, request_id))
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    status: &'static str,
    service: String,
    version: String,
    timestamp: UtcDateTime,
    uptime_secs: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        service: state.service_name.to_string(),
        version: state.version.to_string(),
        timestamp: UtcDateTime::now(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
