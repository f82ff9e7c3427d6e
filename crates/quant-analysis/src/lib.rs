//! Per-symbol screen metrics: liquidity, Sharpe ratio, smoothed Parkinson
//! volatility and trailing new-high / new-low streaks.

pub mod indicators;

use analysis_core::{AnalysisError, AnalysisOutcome, Bar, StreakSource, TickerMetrics};
use indicators::{
    ewma, last_value_percentile, log_returns, new_high_flags, new_low_flags, parkinson_variance,
    round_to, sharpe_ratio, trailing_run,
};

/// Default minimum latest-bar dollar volume
pub const DEFAULT_MIN_DOLLAR_VOLUME: f64 = 1_000_000.0;
/// Longest EWMA span applied to the volatility series
const MAX_VOLATILITY_SPAN: usize = 21;
/// Calendar-day annualization factor for the Parkinson estimator
const ANNUALIZATION_DAYS: f64 = 365.0;

pub struct ScreenMetricsEngine {
    min_dollar_volume: f64,
}

impl ScreenMetricsEngine {
    pub fn new() -> Self {
        Self::with_min_dollar_volume(DEFAULT_MIN_DOLLAR_VOLUME)
    }

    pub fn with_min_dollar_volume(min_dollar_volume: f64) -> Self {
        Self { min_dollar_volume }
    }

    /// Analyze one symbol's daily bars (oldest first).
    ///
    /// Never panics or returns NaN metrics: bad input becomes
    /// `AnalysisOutcome::Failure`, thin trading becomes `Excluded`.
    pub fn analyze(&self, symbol: &str, bars: &[Bar]) -> AnalysisOutcome {
        match self.compute(symbol, bars) {
            Ok(outcome) => outcome,
            Err(e) => AnalysisOutcome::Failure(e),
        }
    }

    fn compute(&self, symbol: &str, bars: &[Bar]) -> Result<AnalysisOutcome, AnalysisError> {
        if bars.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "{} bars, need at least 2",
                bars.len()
            )));
        }
        for bar in bars {
            bar.validate()?;
        }

        let latest = &bars[bars.len() - 1];
        let dollar_volume = latest.dollar_volume();
        if dollar_volume < self.min_dollar_volume {
            return Ok(AnalysisOutcome::Excluded { dollar_volume });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let sharpe = sharpe_ratio(&log_returns(&closes));

        let (annualized_volatility, volatility_percentile) = self.smoothed_volatility(bars)?;
        let (streak_count, streak_source) = self.streak(bars);

        Ok(AnalysisOutcome::Metrics(TickerMetrics {
            symbol: symbol.to_string(),
            dollar_volume,
            sharpe_ratio: sharpe,
            annualized_volatility,
            volatility_percentile,
            streak_count,
            streak_source,
        }))
    }

    /// Latest EWMA-smoothed annualized Parkinson volatility and its
    /// percentile within the symbol's own smoothed history.
    fn smoothed_volatility(&self, bars: &[Bar]) -> Result<(f64, f64), AnalysisError> {
        let annualized: Vec<f64> = bars
            .iter()
            .map(|b| (parkinson_variance(b.high, b.low) * ANNUALIZATION_DAYS).sqrt())
            .collect();

        let span = bars.len().min(MAX_VOLATILITY_SPAN);
        let smoothed = ewma(&annualized, span);

        let current = smoothed
            .last()
            .copied()
            .filter(|v| v.is_finite())
            .ok_or_else(|| AnalysisError::InvalidData("volatility is not finite".to_string()))?;
        let percentile = last_value_percentile(&smoothed)
            .ok_or_else(|| AnalysisError::InsufficientData("empty volatility series".to_string()))?;

        Ok((round_to(current, 2), round_to(percentile, 2)))
    }

    /// Trailing new-high run vs trailing new-low run; ties go to Low.
    fn streak(&self, bars: &[Bar]) -> (usize, StreakSource) {
        let high_run = trailing_run(new_high_flags(bars));
        let low_run = trailing_run(new_low_flags(bars));

        if high_run > low_run {
            (high_run, StreakSource::High)
        } else {
            (low_run, StreakSource::Low)
        }
    }
}

impl Default for ScreenMetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}
