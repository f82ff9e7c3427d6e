use async_trait::async_trait;
use crate::{AnalysisError, Bar};

/// Lists ticker symbols believed to be currently tradable common equities
#[async_trait]
pub trait SymbolSource: Send + Sync {
    async fn active_symbols(&self) -> Result<Vec<String>, AnalysisError>;
}

/// Retrieves adjusted daily bars for one symbol, oldest first
#[async_trait]
pub trait BarSource: Send + Sync {
    async fn daily_bars(&self, symbol: &str, window_days: usize) -> Result<Vec<Bar>, AnalysisError>;
}
