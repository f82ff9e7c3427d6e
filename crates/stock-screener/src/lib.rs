//! Equity screener: analyzes each symbol's recent daily bars, remembers
//! symbols that cannot be analyzed, ranks the rest cross-sectionally and
//! writes a streak-ordered report.

pub mod config;
pub mod error;
pub mod failure_cache;
mod fs_util;
pub mod orchestrator;
pub mod ranker;
pub mod report;
pub mod run_lock;
pub mod telemetry;

pub use config::ScreenConfig;
pub use error::ScreenError;
pub use failure_cache::FailureCache;
pub use orchestrator::{ScreenOrchestrator, ScreenRun};
pub use ranker::{CrossSectionalRanker, RankedReport, RankedRow, ReportOrder};
pub use telemetry::{RunSummary, ScreenTelemetry, TracingTelemetry};
