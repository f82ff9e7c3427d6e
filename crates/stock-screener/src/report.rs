use analysis_core::StreakSource;
use serde::Serialize;
use std::path::Path;

use crate::error::ScreenError;
use crate::fs_util::write_atomically;
use crate::ranker::{RankedReport, RankedRow};

/// Persisted report columns, in order
pub const REPORT_COLUMNS: [&str; 4] = ["Ticker", "StreakCount", "StreakSource", "$Volume(M)"];

#[derive(Serialize)]
struct ReportRecord<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
    #[serde(rename = "StreakCount")]
    streak_count: usize,
    #[serde(rename = "StreakSource")]
    streak_source: StreakSource,
    #[serde(rename = "$Volume(M)")]
    dollar_volume_millions: f64,
}

impl<'a> From<&'a RankedRow> for ReportRecord<'a> {
    fn from(row: &'a RankedRow) -> Self {
        Self {
            ticker: &row.metrics.symbol,
            streak_count: row.metrics.streak_count,
            streak_source: row.metrics.streak_source,
            dollar_volume_millions: row.dollar_volume_millions(),
        }
    }
}

/// Encode the full report as CSV with a header row
pub fn to_csv(report: &RankedReport) -> Result<Vec<u8>, ScreenError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(REPORT_COLUMNS)?;
    for row in report.rows() {
        writer.serialize(ReportRecord::from(row))?;
    }

    writer
        .into_inner()
        .map_err(|e| ScreenError::Io(e.into_error()))
}

/// Write the full report to `path`, replacing any previous run's file
pub fn write_csv(report: &RankedReport, path: &Path) -> Result<(), ScreenError> {
    let bytes = to_csv(report)?;
    write_atomically(path, &bytes).map_err(|source| ScreenError::Report {
        path: path.to_path_buf(),
        source,
    })
}

/// Right-aligned text table of the given rows
pub fn render_table(rows: &[RankedRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.metrics.symbol.clone(),
                row.metrics.streak_count.to_string(),
                row.metrics.streak_source.to_string(),
                format!("{:.2}", row.dollar_volume_millions()),
            ]
        })
        .collect();

    let mut widths = REPORT_COLUMNS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    let format_line = |fields: [&str; 4]| {
        fields
            .iter()
            .zip(widths)
            .map(|(field, width)| format!("{:>width$}", field, width = width))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = vec![format_line(REPORT_COLUMNS)];
    for line in &cells {
        lines.push(format_line([&line[0], &line[1], &line[2], &line[3]]));
    }
    lines.join("\n")
}
