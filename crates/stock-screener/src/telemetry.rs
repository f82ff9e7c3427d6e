use analysis_core::AnalysisError;
use std::path::Path;

use crate::ranker::RankedReport;
use crate::report::render_table;

/// Counters for one screening run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Symbols supplied by the universe
    pub candidates: usize,
    /// Symbols skipped because they already failed in an earlier run
    pub skipped_known_bad: usize,
    /// Symbols fetched and analyzed this run
    pub processed: usize,
    pub analyzed: usize,
    pub excluded: usize,
    pub new_failures: usize,
}

/// Receives run events from the orchestrator.
///
/// Injected at construction; `TracingTelemetry` is the production sink.
pub trait ScreenTelemetry: Send + Sync {
    fn run_started(&self, summary: &RunSummary);

    fn symbol_started(&self, _position: usize, _total: usize, _symbol: &str) {}

    fn symbol_excluded(&self, symbol: &str, dollar_volume: f64);

    fn symbol_failed(&self, symbol: &str, error: &AnalysisError);

    fn no_valid_results(&self);

    fn report_ready(&self, report: &RankedReport, top: usize);

    fn report_saved(&self, path: &Path);

    fn run_finished(&self, summary: &RunSummary);
}

fn top_heading(report: &RankedReport, top: usize) -> String {
    let shown = report.top(top).len();
    if shown < report.len() {
        format!("Top {} of {} tickers:", shown, report.len())
    } else {
        format!("All {} tickers:", shown)
    }
}

/// Logs run events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl ScreenTelemetry for TracingTelemetry {
    fn run_started(&self, summary: &RunSummary) {
        tracing::info!(
            "Processing {} tickers ({} candidates, {} known bad skipped)...",
            summary.processed,
            summary.candidates,
            summary.skipped_known_bad
        );
    }

    fn symbol_started(&self, position: usize, total: usize, symbol: &str) {
        tracing::debug!("[{}/{}] {}", position, total, symbol);
    }

    fn symbol_excluded(&self, symbol: &str, dollar_volume: f64) {
        tracing::debug!("{}: excluded, dollar volume {:.0} below threshold", symbol, dollar_volume);
    }

    fn symbol_failed(&self, symbol: &str, error: &AnalysisError) {
        tracing::error!("{}: Failed ({})", symbol, error);
    }

    fn no_valid_results(&self) {
        tracing::warn!("No valid tickers found.");
    }

    fn report_ready(&self, report: &RankedReport, top: usize) {
        tracing::info!("{}", top_heading(report, top));
        tracing::info!("\n{}", render_table(report.top(top)));
    }

    fn report_saved(&self, path: &Path) {
        tracing::info!("Results saved to {}", path.display());
    }

    fn run_finished(&self, summary: &RunSummary) {
        tracing::info!(
            "Run complete: {} processed, {} analyzed, {} excluded, {} failed",
            summary.processed,
            summary.analyzed,
            summary.excluded,
            summary.new_failures
        );
        if summary.new_failures > 0 {
            tracing::warn!(
                "{} new tickers failed. Added to bad tickers list.",
                summary.new_failures
            );
        }
    }
}
