use analysis_core::{AnalysisOutcome, BarSource, SymbolSource, TickerMetrics};
use quant_analysis::ScreenMetricsEngine;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::ScreenConfig;
use crate::error::ScreenError;
use crate::failure_cache::FailureCache;
use crate::ranker::{CrossSectionalRanker, RankedReport};
use crate::report;
use crate::run_lock::RunLock;
use crate::telemetry::{RunSummary, ScreenTelemetry};

/// What one run produced
#[derive(Debug)]
pub struct ScreenRun {
    pub summary: RunSummary,
    /// `None` when no symbol produced valid metrics
    pub report: Option<RankedReport>,
    /// Symbols newly added to the failure cache
    pub new_failures: BTreeSet<String>,
}

/// Drives one screening run: filter, analyze each symbol in turn, record
/// failures, rank and persist the report.
pub struct ScreenOrchestrator {
    config: ScreenConfig,
    bar_source: Arc<dyn BarSource>,
    engine: ScreenMetricsEngine,
    ranker: CrossSectionalRanker,
    failure_cache: FailureCache,
    telemetry: Arc<dyn ScreenTelemetry>,
}

impl ScreenOrchestrator {
    pub fn new(
        config: ScreenConfig,
        bar_source: Arc<dyn BarSource>,
        telemetry: Arc<dyn ScreenTelemetry>,
    ) -> Self {
        Self {
            engine: ScreenMetricsEngine::with_min_dollar_volume(config.min_dollar_volume),
            ranker: CrossSectionalRanker::new(config.report_order),
            failure_cache: FailureCache::new(config.failure_path()),
            config,
            bar_source,
            telemetry,
        }
    }

    /// Screen the symbols listed by `source`.
    ///
    /// A failing symbol source is logged and treated as an empty universe.
    pub async fn run_with_source(&mut self, source: &dyn SymbolSource) -> Result<ScreenRun, ScreenError> {
        let universe = source.active_symbols().await.unwrap_or_else(|e| {
            tracing::error!("Symbol universe unavailable: {}", e);
            Vec::new()
        });
        self.run(universe).await
    }

    /// Screen `universe` in order.
    ///
    /// Only failure-cache and report I/O abort the run; per-symbol errors
    /// are recorded and the batch continues.
    pub async fn run(&mut self, universe: Vec<String>) -> Result<ScreenRun, ScreenError> {
        let _lock = RunLock::acquire(&self.config.lock_path())?;

        let mut summary = RunSummary {
            candidates: universe.len(),
            ..RunSummary::default()
        };

        let symbols = self.select_symbols(universe, &mut summary)?;
        summary.processed = symbols.len();
        self.telemetry.run_started(&summary);

        let mut results: Vec<TickerMetrics> = Vec::new();
        let mut new_failures: BTreeSet<String> = BTreeSet::new();

        let total = symbols.len();
        for (i, symbol) in symbols.into_iter().enumerate() {
            self.telemetry.symbol_started(i + 1, total, &symbol);

            let outcome = match self.bar_source.daily_bars(&symbol, self.config.window_days).await {
                Ok(bars) => self.engine.analyze(&symbol, &bars),
                Err(e) => AnalysisOutcome::Failure(e),
            };

            match outcome {
                AnalysisOutcome::Metrics(metrics) => results.push(metrics),
                AnalysisOutcome::Excluded { dollar_volume } => {
                    summary.excluded += 1;
                    self.telemetry.symbol_excluded(&symbol, dollar_volume);
                }
                AnalysisOutcome::Failure(e) => {
                    self.telemetry.symbol_failed(&symbol, &e);
                    new_failures.insert(symbol);
                }
            }
        }

        summary.analyzed = results.len();
        summary.new_failures = new_failures.len();

        if !new_failures.is_empty() {
            self.failure_cache.record(new_failures.iter().cloned())?;
        }

        if results.is_empty() {
            self.telemetry.no_valid_results();
            self.telemetry.run_finished(&summary);
            return Ok(ScreenRun {
                summary,
                report: None,
                new_failures,
            });
        }

        let ranked = self.ranker.rank(results);
        self.telemetry.report_ready(&ranked, self.config.summary_rows);

        let report_path = self.config.report_path();
        report::write_csv(&ranked, &report_path)?;
        self.telemetry.report_saved(&report_path);
        self.telemetry.run_finished(&summary);

        Ok(ScreenRun {
            summary,
            report: Some(ranked),
            new_failures,
        })
    }

    /// Drop known-bad symbols (exact, case-sensitive match), then apply the cap
    fn select_symbols(
        &mut self,
        universe: Vec<String>,
        summary: &mut RunSummary,
    ) -> Result<Vec<String>, ScreenError> {
        let known_bad = self.failure_cache.load()?;
        let fresh: Vec<String> = universe
            .into_iter()
            .filter(|s| !known_bad.contains(s))
            .collect();
        summary.skipped_known_bad = summary.candidates - fresh.len();

        Ok(match self.config.max_symbols {
            Some(cap) => fresh.into_iter().take(cap).collect(),
            None => fresh,
        })
    }
}
