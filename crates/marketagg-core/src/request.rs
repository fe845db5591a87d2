//! Validated request types.
//!
//! | Kind | Request | Limit range | Cache key |
//! |------|---------|-------------|-----------|
//! | Ticker | [`TickerRequest`] | n/a | `ticker:{symbol}` |
//! | Klines | [`KlinesRequest`] | 1..=1000 | `klines:{symbol}:{interval}:{limit}` |
//! | Depth | [`DepthRequest`] | 1..=100 | `depth:{symbol}:{limit}` |
//!
//! Raw caller input is checked here, before any cache lookup or provider
//! call. Limits arrive as signed integers so that negative values are
//! reported as such instead of wrapping.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::ValidationError;
use crate::{Interval, Symbol};

pub const MAX_KLINES_LIMIT: u16 = 1_000;
pub const MAX_DEPTH_LIMIT: u16 = 100;
pub const DEFAULT_KLINES_LIMIT: u16 = 100;
pub const DEFAULT_DEPTH_LIMIT: u16 = 20;
pub const DEFAULT_INTERVAL: Interval = Interval::OneHour;

/// Market data kind, used as the cache key prefix and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Ticker,
    Klines,
    Depth,
}

impl DataKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::Klines => "klines",
            Self::Depth => "depth",
        }
    }
}

impl Display for DataKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerRequest {
    pub symbol: Symbol,
}

impl TickerRequest {
    pub fn new(symbol: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            symbol: Symbol::parse(symbol)?,
        })
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(format!("{}:{}", DataKind::Ticker, self.symbol))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlinesRequest {
    pub symbol: Symbol,
    pub interval: Interval,
    pub limit: u16,
}

impl KlinesRequest {
    pub fn new(symbol: &str, interval: &str, limit: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            symbol: Symbol::parse(symbol)?,
            interval: interval.parse()?,
            limit: bounded_limit(limit, MAX_KLINES_LIMIT)?,
        })
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(format!(
            "{}:{}:{}:{}",
            DataKind::Klines,
            self.symbol,
            self.interval,
            self.limit
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthRequest {
    pub symbol: Symbol,
    pub limit: u16,
}

impl DepthRequest {
    pub fn new(symbol: &str, limit: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            symbol: Symbol::parse(symbol)?,
            limit: bounded_limit(limit, MAX_DEPTH_LIMIT)?,
        })
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(format!("{}:{}:{}", DataKind::Depth, self.symbol, self.limit))
    }
}

fn bounded_limit(value: i64, max: u16) -> Result<u16, ValidationError> {
    match u16::try_from(value) {
        Ok(limit) if (1..=max).contains(&limit) => Ok(limit),
        _ => Err(ValidationError::InvalidLimit { value, max }),
    }
}
