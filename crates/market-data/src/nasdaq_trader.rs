use analysis_core::{AnalysisError, SymbolSource};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const NASDAQ_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt";
const OTHER_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/SymDir/otherlisted.txt";

/// Security-name suffixes that mark common equity in the symbol directory
const COMMON_STOCK_SUFFIXES: &[&str] = &[" Stock", " Shares"];

const NAME_COLUMN: &str = "Security Name";
const FOOTER_PREFIX: &str = "File Creation Time";

/// One pipe-delimited symbol directory file
struct DirectoryFile {
    url: &'static str,
    symbol_column: &'static str,
}

const DIRECTORY_FILES: &[DirectoryFile] = &[
    DirectoryFile { url: NASDAQ_LISTED_URL, symbol_column: "Symbol" },
    DirectoryFile { url: OTHER_LISTED_URL, symbol_column: "ACT Symbol" },
];

/// Active US common stocks from the NasdaqTrader symbol directory
#[derive(Clone)]
pub struct NasdaqTraderDirectory {
    client: Client,
}

impl NasdaqTraderDirectory {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    async fn fetch_file(&self, file: &DirectoryFile) -> Result<Vec<String>, AnalysisError> {
        let response = self
            .client
            .get(file.url)
            .send()
            .await
            .map_err(|e| AnalysisError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::Fetch(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Fetch(e.to_string()))?;

        parse_directory(&body, file.symbol_column)
    }
}

impl Default for NasdaqTraderDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SymbolSource for NasdaqTraderDirectory {
    async fn active_symbols(&self) -> Result<Vec<String>, AnalysisError> {
        tracing::info!("Fetching active US tickers from NasdaqTrader...");

        let mut symbols = Vec::new();
        for file in DIRECTORY_FILES {
            match self.fetch_file(file).await {
                Ok(mut listed) => symbols.append(&mut listed),
                Err(e) => tracing::error!("Error fetching {}: {}", file.url, e),
            }
        }

        tracing::info!("Retrieved {} active tickers.", symbols.len());
        Ok(symbols)
    }
}

/// Extract common-stock symbols from a pipe-delimited directory file.
///
/// The first line is the header; the trailing "File Creation Time" line
/// is not a listing.
pub fn parse_directory(body: &str, symbol_column: &str) -> Result<Vec<String>, AnalysisError> {
    let mut lines = body.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| AnalysisError::InvalidData("empty symbol directory".to_string()))?
        .split('|')
        .map(str::trim)
        .collect();
    let column = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| AnalysisError::InvalidData(format!("missing column {:?}", name)))
    };
    let symbol_idx = column(symbol_column)?;
    let name_idx = column(NAME_COLUMN)?;

    Ok(lines
        .filter(|l| !l.starts_with(FOOTER_PREFIX))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            let symbol = *fields.get(symbol_idx)?;
            let name = *fields.get(name_idx)?;
            let common = COMMON_STOCK_SUFFIXES.iter().any(|s| name.ends_with(s));
            (common && !symbol.is_empty()).then(|| symbol.to_string())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NASDAQ_SAMPLE: &str = "\
Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
AAPL|Apple Inc. - Common Stock|Q|N|N|100|N|N
QQQ|Invesco QQQ Trust, Series 1|G|N|N|100|Y|N
ABCW |ABC Corp - Warrant|S|N|N|100|N|N
 MSFT | Microsoft Corporation - Common Stock |Q|N|N|100|N|N
File Creation Time: 1018202608:01|||||||
";

    const OTHER_SAMPLE: &str = "\
ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol
BRK.B|Berkshire Hathaway Inc. Class B Shares|N|BRK.B|N|100|N|BRK=B
SPY|SPDR S&P 500 ETF Trust|P|SPY|Y|100|N|SPY
File Creation Time: 1018202608:01|||||||
";

    #[test]
    fn test_parse_nasdaq_listed() {
        let symbols = parse_directory(NASDAQ_SAMPLE, "Symbol").unwrap();
        assert_eq!(symbols, vec!["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[test]
    fn test_parse_other_listed() {
        let symbols = parse_directory(OTHER_SAMPLE, "ACT Symbol").unwrap();
        assert_eq!(symbols, vec!["BRK.B".to_string()]);
    }

    #[test]
    fn test_missing_column_is_invalid() {
        assert!(matches!(
            parse_directory(OTHER_SAMPLE, "Symbol"),
            Err(AnalysisError::InvalidData(_))
        ));
        assert!(parse_directory("", "Symbol").is_err());
    }
}
