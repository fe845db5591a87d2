use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marketagg_core::{MarketError, UtcDateTime};
use serde::Serialize;
use thiserror::Error;

use super::request_id::RequestId;

/// Error returned by market handlers, rendered as
/// `{error, code, request_id, timestamp}`.
///
/// `message` goes to the caller; `detail` carries the underlying provider
/// causes and is only logged.
#[derive(Debug, Error)]
#[error("{code}: {detail}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    detail: String,
    request_id: RequestId,
}

impl ApiError {
    pub fn market(error: MarketError, request_id: RequestId) -> Self {
        let detail = error.to_string();
        let (status, message) = match &error {
            MarketError::Validation(_) => (StatusCode::BAD_REQUEST, detail.clone()),
            MarketError::TickerUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                String::from("unable to fetch ticker data"),
            ),
            MarketError::KlinesUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                String::from("unable to fetch klines data"),
            ),
            MarketError::DepthUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                String::from("unable to fetch depth data"),
            ),
        };
        Self {
            status,
            code: error.code(),
            message,
            detail,
            request_id,
        }
    }

    pub fn invalid_limit(raw: &str, request_id: RequestId) -> Self {
        Self::bad_request("INVALID_LIMIT", format!("limit '{raw}' is not an integer"), request_id)
    }

    pub fn repeated_parameter(code: &'static str, name: &str, request_id: RequestId) -> Self {
        Self::bad_request(code, format!("query parameter '{name}' given more than once"), request_id)
    }

    pub fn malformed_query(rejection: &QueryRejection, request_id: RequestId) -> Self {
        Self::bad_request("INVALID_SYMBOL", rejection.body_text(), request_id)
    }

    fn bad_request(code: &'static str, message: String, request_id: RequestId) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            detail: message.clone(),
            message,
            request_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
    request_id: &'a str,
    timestamp: i64,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(request_id = %self.request_id, code = self.code, error = %self.detail, "request failed");
        } else {
            tracing::debug!(request_id = %self.request_id, code = self.code, error = %self.detail, "request rejected");
        }

        let body = ErrorBody {
            error: &self.message,
            code: self.code,
            request_id: self.request_id.as_str(),
            timestamp: UtcDateTime::now().unix_timestamp(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use marketagg_core::{ProviderError, ProviderId};

    use super::*;

    #[test]
    fn provider_detail_is_logged_but_not_returned() {
        let error = MarketError::TickerUnavailable {
            primary: ProviderError::status(ProviderId::Binance, 502, "<html>upstream secret</html>"),
            secondary: ProviderError::transport(ProviderId::Coingecko, "request timeout"),
        };

        let api = ApiError::market(error, RequestId::generate());

        assert_eq!(api.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.message, "unable to fetch ticker data");
        assert!(api.detail.contains("upstream secret"));
        assert!(api.detail.contains("request timeout"));
    }

    #[test]
    fn validation_message_reaches_the_caller() {
        let api = ApiError::market(
            MarketError::Validation(marketagg_core::ValidationError::EmptySymbol),
            RequestId::generate(),
        );

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "MISSING_SYMBOL");
        assert_eq!(api.message, "symbol cannot be empty");
    }
}
