#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use smacross::domain::error::SmaCrossError;
pub use smacross::domain::price::{PricePoint, PriceSeries};
use smacross::ports::data_port::PriceSource;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, code: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(code.to_string(), points);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmaCrossError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SmaCrossError::DataSource {
                reason: reason.clone(),
            });
        }
        let points: Vec<PricePoint> = self
            .data
            .get(code)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        if points.is_empty() {
            return Err(SmaCrossError::NoData {
                code: code.to_string(),
            });
        }
        PriceSeries::new(points)
    }

    fn list_codes(&self) -> Result<Vec<String>, SmaCrossError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One point per calendar day starting at 2020-01-01.
pub fn points_from_closes(closes: &[f64]) -> Vec<PricePoint> {
    let start = date("2020-01-01");
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + Duration::days(i as i64),
            close,
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(points_from_closes(closes)).unwrap()
}

/// `start`, `start + step`, ... for `n` days.
pub fn linear_series(n: usize, start: f64, step: f64) -> PriceSeries {
    let closes: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    series_from_closes(&closes)
}

pub fn constant_series(n: usize, close: f64) -> PriceSeries {
    series_from_closes(&vec![close; n])
}

/// Rises for `half` days then falls for `half` days, repeated `cycles` times.
pub fn sawtooth_series(half: usize, cycles: usize) -> PriceSeries {
    let mut closes = Vec::with_capacity(2 * half * cycles);
    let mut price = 100.0;
    for _ in 0..cycles {
        for _ in 0..half {
            price += 1.0;
            closes.push(price);
        }
        for _ in 0..half {
            price -= 1.0;
            closes.push(price);
        }
    }
    series_from_closes(&closes)
}

pub fn write_price_csv(dir: &std::path::Path, code: &str, points: &[PricePoint]) {
    let mut content = String::from("Date,Close\n");
    for p in points {
        content.push_str(&format!("{},{}\n", p.date, p.close));
    }
    std::fs::write(dir.join(format!("{code}.csv")), content).unwrap();
}
