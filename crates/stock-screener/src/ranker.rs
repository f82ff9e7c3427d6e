//! Cross-sectional ranking of one run's analyzed symbols.

use analysis_core::TickerMetrics;
use quant_analysis::indicators::{fractional_ranks, round_to};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ScreenError;

/// Primary sort key of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportOrder {
    /// Longest trailing streak first
    #[default]
    StreakCount,
    /// Highest liquidity x Sharpe composite first
    Composite,
}

impl FromStr for ReportOrder {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "streak" | "streak_count" | "streakcount" => Ok(ReportOrder::StreakCount),
            "composite" => Ok(ReportOrder::Composite),
            other => Err(ScreenError::Config(format!(
                "unknown sort order {:?} (expected streak or composite)",
                other
            ))),
        }
    }
}

/// One analyzed symbol with its cross-sectional scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub metrics: TickerMetrics,
    /// Fractional rank of dollar volume within the run (3 decimals)
    pub dollar_volume_percentile: f64,
    /// Fractional rank of Sharpe ratio within the run (3 decimals)
    pub sharpe_percentile: f64,
    /// Product of the two percentiles (3 decimals)
    pub composite: f64,
}

impl RankedRow {
    /// Latest dollar volume in millions, 2 decimals
    pub fn dollar_volume_millions(&self) -> f64 {
        round_to(self.metrics.dollar_volume / 1_000_000.0, 2)
    }
}

/// All analyzed rows of one run, in report order
#[derive(Debug, Clone, Default)]
pub struct RankedReport {
    rows: Vec<RankedRow>,
}

impl RankedReport {
    pub fn rows(&self) -> &[RankedRow] {
        &self.rows
    }

    /// First `n` rows in report order
    pub fn top(&self, n: usize) -> &[RankedRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct CrossSectionalRanker {
    order: ReportOrder,
}

impl Default for CrossSectionalRanker {
    fn default() -> Self {
        Self::new(ReportOrder::default())
    }
}

impl CrossSectionalRanker {
    pub fn new(order: ReportOrder) -> Self {
        Self { order }
    }

    /// Score every result against the others and sort.
    ///
    /// Sorting is stable, so rows with equal keys keep processing order.
    pub fn rank(&self, results: Vec<TickerMetrics>) -> RankedReport {
        let dollar_volumes: Vec<f64> = results.iter().map(|m| m.dollar_volume).collect();
        let sharpes: Vec<f64> = results.iter().map(|m| m.sharpe_ratio).collect();
        let dv_ranks = fractional_ranks(&dollar_volumes);
        let sharpe_ranks = fractional_ranks(&sharpes);

        let mut rows: Vec<RankedRow> = results
            .into_iter()
            .zip(dv_ranks.into_iter().zip(sharpe_ranks))
            .map(|(metrics, (dv_rank, sharpe_rank))| {
                let dollar_volume_percentile = round_to(dv_rank, 3);
                let sharpe_percentile = round_to(sharpe_rank, 3);
                RankedRow {
                    metrics,
                    dollar_volume_percentile,
                    sharpe_percentile,
                    composite: round_to(dollar_volume_percentile * sharpe_percentile, 3),
                }
            })
            .collect();

        match self.order {
            ReportOrder::StreakCount => {
                rows.sort_by(|a, b| b.metrics.streak_count.cmp(&a.metrics.streak_count))
            }
            ReportOrder::Composite => rows.sort_by(|a, b| {
                b.composite
                    .partial_cmp(&a.composite)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }

        RankedReport { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::StreakSource;

    fn metrics(symbol: &str, dollar_volume: f64, sharpe: f64, streak: usize) -> TickerMetrics {
        TickerMetrics {
            symbol: symbol.to_string(),
            dollar_volume,
            sharpe_ratio: sharpe,
            annualized_volatility: 0.25,
            volatility_percentile: 0.5,
            streak_count: streak,
            streak_source: StreakSource::High,
        }
    }

    fn row<'a>(report: &'a RankedReport, symbol: &str) -> &'a RankedRow {
        report
            .rows()
            .iter()
            .find(|r| r.metrics.symbol == symbol)
            .unwrap()
    }

    #[test]
    fn test_dollar_volume_percentiles() {
        let report = CrossSectionalRanker::default().rank(vec![
            metrics("A", 100.0, 0.1, 0),
            metrics("B", 200.0, 0.2, 0),
            metrics("C", 300.0, 0.3, 0),
        ]);

        assert!((row(&report, "A").dollar_volume_percentile - 1.0 / 3.0).abs() < 1e-3);
        assert!((row(&report, "B").dollar_volume_percentile - 2.0 / 3.0).abs() < 1e-3);
        assert_eq!(row(&report, "C").dollar_volume_percentile, 1.0);
        assert_eq!(row(&report, "C").composite, 1.0);
        assert_eq!(row(&report, "A").composite, 0.111);
    }

    #[test]
    fn test_ties_average_ranks() {
        let report = CrossSectionalRanker::default().rank(vec![
            metrics("A", 100.0, 0.5, 0),
            metrics("B", 100.0, 0.5, 0),
            metrics("C", 300.0, 0.1, 0),
            metrics("D", 50.0, 0.5, 0),
        ]);

        assert_eq!(row(&report, "A").dollar_volume_percentile, 0.625);
        assert_eq!(row(&report, "B").dollar_volume_percentile, 0.625);
        assert_eq!(row(&report, "D").dollar_volume_percentile, 0.25);
        // Three Sharpe ratios tie at ranks 2..4
        assert_eq!(row(&report, "A").sharpe_percentile, 0.75);
        assert_eq!(row(&report, "C").sharpe_percentile, 0.25);
    }

    #[test]
    fn test_percentiles_round_halves_to_even() {
        let rows: Vec<TickerMetrics> = (1..=16)
            .map(|i| metrics(&format!("T{}", i), i as f64 * 1e6, 0.0, 0))
            .collect();
        let report = CrossSectionalRanker::default().rank(rows);

        // 1/16 and 5/16 sit exactly on a half at the third decimal
        assert_eq!(row(&report, "T1").dollar_volume_percentile, 0.062);
        assert_eq!(row(&report, "T3").dollar_volume_percentile, 0.188);
        assert_eq!(row(&report, "T5").dollar_volume_percentile, 0.312);
        // All Sharpe ratios tie: (0 + 17/2) / 16 = 0.53125
        assert_eq!(row(&report, "T1").sharpe_percentile, 0.531);
    }

    #[test]
    fn test_sorted_by_streak_descending_and_stable() {
        let report = CrossSectionalRanker::new(ReportOrder::StreakCount).rank(vec![
            metrics("A", 100.0, 0.1, 2),
            metrics("B", 200.0, 0.2, 5),
            metrics("C", 300.0, 0.3, 2),
            metrics("D", 400.0, 0.4, 0),
        ]);
        let order: Vec<&str> = report.rows().iter().map(|r| r.metrics.symbol.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_sorted_by_composite() {
        let report = CrossSectionalRanker::new(ReportOrder::Composite).rank(vec![
            metrics("LOW", 100.0, 0.1, 9),
            metrics("HIGH", 300.0, 0.3, 0),
            metrics("MID", 200.0, 0.2, 1),
        ]);
        let order: Vec<&str> = report.rows().iter().map(|r| r.metrics.symbol.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "MID", "LOW"]);
    }

    #[test]
    fn test_single_row_is_top_of_everything() {
        let report = CrossSectionalRanker::default().rank(vec![metrics("ONLY", 5e6, -0.2, 1)]);
        assert_eq!(report.len(), 1);
        assert_eq!(report.rows()[0].composite, 1.0);
    }

    #[test]
    fn test_top_clamps() {
        let report = CrossSectionalRanker::default()
            .rank(vec![metrics("A", 1.0, 0.0, 0), metrics("B", 2.0, 0.0, 0)]);
        assert_eq!(report.top(50).len(), 2);
        assert_eq!(report.top(1).len(), 1);
        assert!(RankedReport::default().is_empty());
    }

    #[test]
    fn test_dollar_volume_millions() {
        let report = CrossSectionalRanker::default().rank(vec![metrics("A", 12_345_678.0, 0.0, 0)]);
        assert_eq!(report.rows()[0].dollar_volume_millions(), 12.35);
    }

    #[test]
    fn test_report_order_parse() {
        assert_eq!("streak".parse::<ReportOrder>().unwrap(), ReportOrder::StreakCount);
        assert_eq!("Composite".parse::<ReportOrder>().unwrap(), ReportOrder::Composite);
        assert!("volume".parse::<ReportOrder>().is_err());
    }
}
