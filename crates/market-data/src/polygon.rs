use analysis_core::{AnalysisError, Bar, BarSource};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://api.polygon.io";

/// Free-tier allowance; paid plans should raise POLYGON_RATE_LIMIT.
const DEFAULT_RATE_LIMIT: usize = 5;
const RATE_WINDOW: Duration = Duration::from_secs(60);
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(15);

/// At most `capacity` requests in any `window`
struct RateLimiter {
    sent: Mutex<VecDeque<Instant>>,
    capacity: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(capacity: usize, window: Duration) -> Self {
        Self {
            sent: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            window,
        }
    }

    /// Take a slot at `now`, or return how long until one frees up.
    fn reserve(&self, sent: &mut VecDeque<Instant>, now: Instant) -> Option<Duration> {
        sent.retain(|&at| now.duration_since(at) < self.window);
        match sent.front() {
            Some(&oldest) if sent.len() >= self.capacity => {
                Some((oldest + self.window).saturating_duration_since(now))
            }
            _ => {
                sent.push_back(now);
                None
            }
        }
    }

    async fn acquire(&self) {
        loop {
            let wait = {
                let mut sent = self.sent.lock().await;
                match self.reserve(&mut sent, Instant::now()) {
                    None => return,
                    Some(wait) => wait + Duration::from_millis(50),
                }
            };
            tracing::debug!("Polygon rate limit reached, waiting {:.1}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }
}

pub struct PolygonClient {
    api_key: String,
    client: Client,
    limiter: RateLimiter,
}

impl PolygonClient {
    pub fn new(api_key: String) -> Self {
        let rate_limit = std::env::var("POLYGON_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            limiter: RateLimiter::new(rate_limit, RATE_WINDOW),
        }
    }

    /// Adjusted daily bars between two dates, oldest first.
    ///
    /// A 429 is retried after a fixed backoff; any other non-success status fails.
    async fn daily_aggregates(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<Bar>, AnalysisError> {
        let url = format!("{}/v2/aggs/ticker/{}/range/1/day/{}/{}", BASE_URL, symbol, from, to);

        for attempt in 1..=MAX_ATTEMPTS {
            self.limiter.acquire().await;
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("apiKey", self.api_key.as_str()),
                    ("adjusted", "true"),
                    ("sort", "asc"),
                    ("limit", "50000"),
                ])
                .send()
                .await
                .map_err(|e| AnalysisError::Fetch(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("{}: Polygon returned 429 (attempt {}/{})", symbol, attempt, MAX_ATTEMPTS);
                tokio::time::sleep(RETRY_BACKOFF).await;
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AnalysisError::Fetch(format!("HTTP {}: {}", status, body)));
            }

            let aggregates: AggregateResponse = response
                .json()
                .await
                .map_err(|e| AnalysisError::Fetch(e.to_string()))?;
            return aggregates.into_bars();
        }

        Err(AnalysisError::Fetch(format!("still rate limited after {} attempts", MAX_ATTEMPTS)))
    }
}

#[async_trait]
impl BarSource for PolygonClient {
    async fn daily_bars(&self, symbol: &str, window_days: usize) -> Result<Vec<Bar>, AnalysisError> {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(calendar_lookback_days(window_days));
        let bars = self.daily_aggregates(symbol, from, to).await?;
        Ok(trailing_window(bars, window_days))
    }
}

/// Calendar days that comfortably contain `window_days` trading sessions
fn calendar_lookback_days(window_days: usize) -> i64 {
    (window_days as i64 * 7) / 5 + 14
}

/// Keep only the most recent `window_days` bars
fn trailing_window(mut bars: Vec<Bar>, window_days: usize) -> Vec<Bar> {
    if bars.len() > window_days {
        bars.drain(..bars.len() - window_days);
    }
    bars
}

// Response structures
#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<AggregateResult>,
}

#[derive(Debug, Deserialize)]
struct AggregateResult {
    t: i64,         // timestamp
    o: Option<f64>, // open
    h: Option<f64>, // high
    l: Option<f64>, // low
    c: Option<f64>, // close
    v: Option<f64>, // volume
}

impl AggregateResponse {
    fn into_bars(self) -> Result<Vec<Bar>, AnalysisError> {
        self.results.into_iter().map(AggregateResult::into_bar).collect()
    }
}

impl AggregateResult {
    fn into_bar(self) -> Result<Bar, AnalysisError> {
        let timestamp = DateTime::from_timestamp_millis(self.t)
            .ok_or_else(|| AnalysisError::InvalidData(format!("bad bar timestamp {}", self.t)))?;
        let missing = |field: &str| {
            AnalysisError::InvalidData(format!("missing {} at {}", field, timestamp))
        };

        Ok(Bar {
            timestamp,
            open: self.o.ok_or_else(|| missing("open"))?,
            high: self.h.ok_or_else(|| missing("high"))?,
            low: self.l.ok_or_else(|| missing("low"))?,
            close: self.c.ok_or_else(|| missing("close"))?,
            volume: self.v.ok_or_else(|| missing("volume"))?,
        })
    }
}
