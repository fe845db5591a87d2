use thiserror::Error;

use marketagg_core::{MarketError, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Market(error) if error.is_caller_error() => 2,
            Self::Market(_) => 3,
            Self::Config(_) | Self::InvalidSetting { .. } | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use marketagg_core::{ProviderError, ProviderId};

    use super::*;

    #[test]
    fn exit_codes_separate_caller_and_upstream_failures() {
        let caller = CliError::from(MarketError::from(ValidationError::EmptySymbol));
        assert_eq!(caller.exit_code(), 2);

        let upstream = CliError::from(MarketError::KlinesUnavailable(ProviderError::transport(
            ProviderId::Binance,
            "timeout",
        )));
        assert_eq!(upstream.exit_code(), 3);

        let io = CliError::from(std::io::Error::other("bind failed"));
        assert_eq!(io.exit_code(), 10);
    }
}
