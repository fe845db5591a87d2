use thiserror::Error;

use crate::provider::ProviderError;

/// Validation errors for caller input and configuration exposed by `marketagg-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} is outside {min}..={max}")]
    SymbolLength { len: usize, min: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error(
        "invalid interval '{value}', expected one of 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 6h, 8h, 12h, 1d, 3d, 1w, 1M"
    )]
    InvalidInterval { value: String },
    #[error("limit {value} must be between 1 and {max}")]
    InvalidLimit { value: i64, max: u16 },

    #[error("'{value}' is not an exact decimal number")]
    InvalidDecimal { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("epoch milliseconds {value} are out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("cache ttl '{name}' must be greater than zero")]
    ZeroTtl { name: &'static str },
    #[error("cache ttl '{name}' of {secs}s exceeds the {max_secs}s maximum")]
    TtlTooLong {
        name: &'static str,
        secs: u64,
        max_secs: u64,
    },
    #[error("cache ttl ordering violated: {reason}")]
    TtlOrdering { reason: &'static str },
}

impl ValidationError {
    /// Stable machine-readable code reported at the request boundary.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptySymbol => "MISSING_SYMBOL",
            Self::SymbolLength { .. } | Self::SymbolInvalidChar { .. } => "INVALID_SYMBOL",
            Self::InvalidInterval { .. } => "INVALID_INTERVAL",
            Self::InvalidLimit { .. } => "INVALID_LIMIT",
            Self::InvalidDecimal { .. }
            | Self::TimestampNotUtc { .. }
            | Self::TimestampOutOfRange { .. } => "INVALID_VALUE",
            Self::ZeroTtl { .. } | Self::TtlTooLong { .. } | Self::TtlOrdering { .. } => {
                "INVALID_CONFIG"
            },
        }
    }
}

/// Failure of one market data operation.
///
/// Caller errors are never retried. Provider failures are only ever wrapped
/// here after the fallback chain for that data kind has been exhausted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to fetch ticker data: primary={primary}, secondary={secondary}")]
    TickerUnavailable {
        primary: ProviderError,
        secondary: ProviderError,
    },

    #[error("failed to fetch klines: {0}")]
    KlinesUnavailable(ProviderError),

    #[error("failed to fetch depth: {0}")]
    DepthUnavailable(ProviderError),
}

impl MarketError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(error) => error.code(),
            Self::TickerUnavailable { .. } => "TICKER_UNAVAILABLE",
            Self::KlinesUnavailable(_) => "KLINES_UNAVAILABLE",
            Self::DepthUnavailable(_) => "DEPTH_UNAVAILABLE",
        }
    }

    /// Returns `true` when the caller supplied bad input (a 4xx-class outcome).
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderId;

    #[test]
    fn validation_codes_follow_the_public_contract() {
        assert_eq!(ValidationError::EmptySymbol.code(), "MISSING_SYMBOL");
        assert_eq!(
            ValidationError::SymbolInvalidChar { ch: '$', index: 3 }.code(),
            "INVALID_SYMBOL"
        );
        assert_eq!(
            ValidationError::InvalidLimit {
                value: 0,
                max: 100
            }
            .code(),
            "INVALID_LIMIT"
        );
    }

    #[test]
    fn ticker_unavailable_names_both_failures() {
        let error = MarketError::TickerUnavailable {
            primary: ProviderError::transport(ProviderId::Binance, "connection refused"),
            secondary: ProviderError::unsupported_symbol(ProviderId::Coingecko, "FOOUSDT"),
        };

        let message = error.to_string();
        assert!(message.contains("connection refused"), "{message}");
        assert!(message.contains("unsupported symbol: FOOUSDT"), "{message}");
        assert_eq!(error.code(), "TICKER_UNAVAILABLE");
        assert!(!error.is_caller_error());
    }
}
