//! CSV file price source adapter.
//!
//! Reads `<base_path>/<CODE>.csv`. The header must name a date column
//! (`date`) and a close column (`close`, `adj_close` or `adj close`),
//! matched case-insensitively; other columns are ignored.

use crate::domain::error::SmaCrossError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

const CLOSE_HEADERS: [&str; 3] = ["close", "adj_close", "adj close"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("null")
}

impl PriceSource for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmaCrossError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| SmaCrossError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| SmaCrossError::DataSource {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let date_col = column_index(&headers, &["date"]).ok_or_else(|| SmaCrossError::DataSource {
            reason: "missing date column".into(),
        })?;
        let close_col =
            column_index(&headers, &CLOSE_HEADERS).ok_or_else(|| SmaCrossError::DataSource {
                reason: "missing close column".into(),
            })?;

        let mut points = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| SmaCrossError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| SmaCrossError::DataSource {
                reason: "missing date value".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                SmaCrossError::DataSource {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or("");
            if is_missing(close_str) {
                dropped += 1;
                continue;
            }
            let close: f64 = close_str
                .trim()
                .parse()
                .map_err(|e| SmaCrossError::DataSource {
                    reason: format!("invalid close value on {}: {}", date, e),
                })?;

            points.push(PricePoint { date, close });
        }

        if dropped > 0 {
            warn!(code, dropped, "dropped rows with missing close");
        }
        if points.is_empty() {
            return Err(SmaCrossError::NoData {
                code: code.to_string(),
            });
        }

        points.sort_by_key(|p| p.date);
        debug!(code, rows = points.len(), path = %path.display(), "prices loaded");
        PriceSeries::new(points)
    }

    fn list_codes(&self) -> Result<Vec<String>, SmaCrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SmaCrossError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut codes = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SmaCrossError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(".csv") {
                codes.push(code.to_string());
            }
        }

        codes.sort();
        Ok(codes)
    }
}
