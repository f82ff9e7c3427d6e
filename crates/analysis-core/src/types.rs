use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Dollar value traded over the bar (volume x close)
    pub fn dollar_volume(&self) -> f64 {
        self.volume * self.close
    }

    /// Check that prices are finite and positive, volume is non-negative
    /// and the high/low range is well formed.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::InvalidData(format!(
                    "{} = {} at {}",
                    field, value, self.timestamp
                )));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(AnalysisError::InvalidData(format!(
                "volume = {} at {}",
                self.volume, self.timestamp
            )));
        }
        if self.high < self.low {
            return Err(AnalysisError::InvalidData(format!(
                "high {} below low {} at {}",
                self.high, self.low, self.timestamp
            )));
        }
        Ok(())
    }
}

/// Which side produced the longer trailing streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakSource {
    High,
    Low,
}

impl StreakSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreakSource::High => "High",
            StreakSource::Low => "Low",
        }
    }
}

impl std::fmt::Display for StreakSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-symbol screen metrics computed from a daily bar series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub symbol: String,
    /// Latest bar volume x close
    pub dollar_volume: f64,
    /// Mean / sample stdev of daily log returns, 0 when stdev is 0 or undefined
    pub sharpe_ratio: f64,
    /// Latest smoothed, annualized Parkinson volatility (2 decimals)
    pub annualized_volatility: f64,
    /// Rank of the latest smoothed volatility within its own history (0-1, 2 decimals)
    pub volatility_percentile: f64,
    pub streak_count: usize,
    pub streak_source: StreakSource,
}

/// Result of analyzing one symbol
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Enough data and adequate liquidity
    Metrics(TickerMetrics),
    /// Valid data below the liquidity threshold; dropped from this run only
    Excluded { dollar_volume: f64 },
    /// Unusable data or a fetch failure; the symbol is remembered as bad
    Failure(AnalysisError),
}

impl AnalysisOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisOutcome::Failure(_))
    }
}
