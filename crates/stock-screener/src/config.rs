use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ScreenError;
use crate::ranker::ReportOrder;

pub const DEFAULT_WINDOW_DAYS: usize = 63;
pub const DEFAULT_MIN_DOLLAR_VOLUME: f64 = quant_analysis::DEFAULT_MIN_DOLLAR_VOLUME;
pub const DEFAULT_MAX_SYMBOLS: usize = 100;
pub const DEFAULT_SUMMARY_ROWS: usize = 50;

const DEFAULT_OUTPUT_DIR: &str = "output";
const REPORT_FILE: &str = "stockScreener.csv";
const FAILURE_FILE: &str = "stockScreener_badTickers.txt";
const LOG_FILE: &str = "stockScreener.log";
const LOCK_FILE: &str = ".stock-screener.lock";

/// Screening run configuration.
///
/// Resolution order: defaults, then environment, then command-line flags.
/// File paths not set explicitly live in `output_dir`.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    /// Trading days of history requested per symbol
    pub window_days: usize,
    /// Latest-bar dollar volume below which a symbol is excluded
    pub min_dollar_volume: f64,
    /// At most this many symbols are analyzed per run; `None` means all
    pub max_symbols: Option<usize>,
    pub output_dir: PathBuf,
    pub report_path: Option<PathBuf>,
    pub failure_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    /// Rows rendered in the console summary
    pub summary_rows: usize,
    pub report_order: ReportOrder,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            min_dollar_volume: DEFAULT_MIN_DOLLAR_VOLUME,
            max_symbols: Some(DEFAULT_MAX_SYMBOLS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_path: None,
            failure_path: None,
            log_path: None,
            summary_rows: DEFAULT_SUMMARY_ROWS,
            report_order: ReportOrder::default(),
        }
    }
}

impl ScreenConfig {
    /// Defaults overridden by `SCREENER_*` environment variables
    pub fn from_env() -> Result<Self, ScreenError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScreenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut config = Self::default();
        if let Some(v) = get("SCREENER_WINDOW_DAYS") {
            config.window_days = parse_value("SCREENER_WINDOW_DAYS", &v)?;
        }
        if let Some(v) = get("SCREENER_MIN_DOLLAR_VOLUME") {
            config.min_dollar_volume = parse_value("SCREENER_MIN_DOLLAR_VOLUME", &v)?;
        }
        if let Some(v) = get("SCREENER_MAX_SYMBOLS") {
            config.max_symbols = symbol_cap(parse_value("SCREENER_MAX_SYMBOLS", &v)?);
        }
        if let Some(v) = get("SCREENER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        config.report_path = get("SCREENER_REPORT_PATH").map(PathBuf::from);
        config.failure_path = get("SCREENER_FAILURE_PATH").map(PathBuf::from);
        config.log_path = get("SCREENER_LOG_PATH").map(PathBuf::from);
        if let Some(v) = get("SCREENER_SORT") {
            config.report_order = v.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `--flag value` overrides. Unknown arguments are left for the caller.
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ScreenError> {
        if let Some(v) = flag_value(args, "--window")? {
            self.window_days = parse_value("--window", v)?;
        }
        if let Some(v) = flag_value(args, "--min-dollar-volume")? {
            self.min_dollar_volume = parse_value("--min-dollar-volume", v)?;
        }
        if let Some(v) = flag_value(args, "--limit")? {
            self.max_symbols = symbol_cap(parse_value("--limit", v)?);
        }
        if let Some(v) = flag_value(args, "--output-dir")? {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = flag_value(args, "--report")? {
            self.report_path = Some(PathBuf::from(v));
        }
        if let Some(v) = flag_value(args, "--bad-tickers")? {
            self.failure_path = Some(PathBuf::from(v));
        }
        if let Some(v) = flag_value(args, "--top")? {
            self.summary_rows = parse_value("--top", v)?;
        }
        if let Some(v) = flag_value(args, "--sort")? {
            self.report_order = v.parse()?;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ScreenError> {
        if self.window_days < 2 {
            return Err(ScreenError::Config(format!(
                "window must cover at least 2 trading days, got {}",
                self.window_days
            )));
        }
        if !self.min_dollar_volume.is_finite() || self.min_dollar_volume < 0.0 {
            return Err(ScreenError::Config(format!(
                "minimum dollar volume must be a non-negative number, got {}",
                self.min_dollar_volume
            )));
        }
        Ok(())
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join(REPORT_FILE))
    }

    pub fn failure_path(&self) -> PathBuf {
        self.failure_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join(FAILURE_FILE))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join(LOG_FILE))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.output_dir.join(LOCK_FILE)
    }

    /// Create the output directory if it does not exist
    pub fn ensure_output_dir(&self) -> Result<(), ScreenError> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}

/// Symbols listed after `--symbols`, up to the next flag
pub fn symbols_from_args(args: &[String]) -> Option<Vec<String>> {
    let idx = args.iter().position(|a| a == "--symbols")?;
    Some(
        args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .cloned()
            .collect(),
    )
}

fn symbol_cap(limit: usize) -> Option<usize> {
    (limit > 0).then_some(limit)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, ScreenError> {
    match args.iter().position(|a| a == flag) {
        None => Ok(None),
        Some(i) => args
            .get(i + 1)
            .filter(|v| !v.starts_with("--"))
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| ScreenError::Config(format!("{} requires a value", flag))),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T, ScreenError> {
    raw.trim()
        .parse()
        .map_err(|_| ScreenError::Config(format!("invalid value {:?} for {}", raw, name)))
}
