use analysis_core::Bar;
use statrs::statistics::Statistics;

/// Daily log returns `ln(close[i] / close[i-1])`
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Mean over sample standard deviation, without annualizing or a
/// risk-free rate. Returns 0 when the deviation is zero or undefined.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return 0.0;
    }

    mean / std_dev
}

/// Parkinson variance of a single bar: `ln(high/low)^2 / (4 ln 2)`
pub fn parkinson_variance(high: f64, low: f64) -> f64 {
    (high / low).ln().powi(2) / (4.0 * std::f64::consts::LN_2)
}

/// Bias-adjusted exponentially weighted moving average.
///
/// Every output point weights observation `t-i` by `(1 - alpha)^i` with
/// `alpha = 2 / (span + 1)` and divides by the sum of weights seen so far,
/// so the first value equals the first observation.
pub fn ewma(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || data.is_empty() {
        return vec![];
    }

    let decay = 1.0 - 2.0 / (span as f64 + 1.0);
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    data.iter()
        .map(|&x| {
            numerator = x + decay * numerator;
            denominator = 1.0 + decay * denominator;
            numerator / denominator
        })
        .collect()
}

/// Fractional rank of every value within the slice.
///
/// Ties share the average of the ranks they span; the result is that
/// average rank divided by the number of values, so the largest value
/// maps to 1.0.
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1 ..= end
        let average = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = average / n as f64;
        }
        start = end;
    }
    ranks
}

/// Fractional rank of the last value against the whole series
pub fn last_value_percentile(series: &[f64]) -> Option<f64> {
    fractional_ranks(series).last().copied()
}

/// Length of the run of `true` values ending at the last element
pub fn trailing_run<I>(flags: I) -> usize
where
    I: IntoIterator<Item = bool>,
{
    flags
        .into_iter()
        .fold(0, |run, flag| if flag { run + 1 } else { 0 })
}

/// Bars whose high exceeds the previous bar's high; bar 0 is never a new high
pub fn new_high_flags(bars: &[Bar]) -> Vec<bool> {
    std::iter::once(false)
        .chain(bars.windows(2).map(|w| w[1].high > w[0].high))
        .take(bars.len())
        .collect()
}

/// Bars whose low is below the previous bar's low; bar 0 is never a new low
pub fn new_low_flags(bars: &[Bar]) -> Vec<bool> {
    std::iter::once(false)
        .chain(bars.windows(2).map(|w| w[1].low < w[0].low))
        .take(bars.len())
        .collect()
}

/// Round to `decimals` places, exact halves going to the even digit
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
