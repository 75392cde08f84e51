//! Indicator builder: moving averages and the binary trend signal.
//!
//! This module provides:
//! - `Trend`: the binary crossover state (flat or long)
//! - `IndicatorSeries`: short and long averages plus the trend signal,
//!   index-aligned with the price series they were built from

pub mod sma;

use std::fmt;

use tracing::debug;

use crate::domain::price::PriceSeries;

/// Binary trend state. `Long` when the short average is strictly above
/// the long average; ties resolve to `Flat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Flat,
    Long,
}

impl Trend {
    pub fn value(self) -> i8 {
        match self {
            Trend::Flat => 0,
            Trend::Long => 1,
        }
    }

    /// Exposure used by the simulator; an undefined signal is flat.
    pub fn exposure(signal: Option<Trend>) -> f64 {
        f64::from(signal.unwrap_or(Trend::Flat).value())
    }

    fn from_averages(short_avg: f64, long_avg: f64) -> Self {
        if short_avg > long_avg {
            Trend::Long
        } else {
            Trend::Flat
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries<'a> {
    pub prices: &'a PriceSeries,
    pub short_window: usize,
    pub long_window: usize,
    pub short_avg: Vec<Option<f64>>,
    pub long_avg: Vec<Option<f64>>,
    pub trend_signal: Vec<Option<Trend>>,
}

impl IndicatorSeries<'_> {
    pub fn len(&self) -> usize {
        self.trend_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trend_signal.is_empty()
    }

    /// Index of the first date where both averages are defined.
    pub fn first_signal_index(&self) -> Option<usize> {
        self.trend_signal.iter().position(Option::is_some)
    }
}

/// Computes both averages and the trend signal. Pure function of the
/// inputs; window ordering is validated by the pipeline entry point.
pub fn build_indicators(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> IndicatorSeries<'_> {
    let closes = prices.closes();
    let short_avg = sma::calculate_sma(&closes, short_window);
    let long_avg = sma::calculate_sma(&closes, long_window);

    let trend_signal: Vec<Option<Trend>> = short_avg
        .iter()
        .zip(&long_avg)
        .map(|(short, long)| match (short, long) {
            (Some(s), Some(l)) => Some(Trend::from_averages(*s, *l)),
            _ => None,
        })
        .collect();

    let series = IndicatorSeries {
        prices,
        short_window,
        long_window,
        short_avg,
        long_avg,
        trend_signal,
    };

    debug!(
        rows = series.len(),
        short_window,
        long_window,
        first_signal = ?series.first_signal_index(),
        "indicators built"
    );

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    close,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn trend_values() {
        assert_eq!(Trend::Flat.value(), 0);
        assert_eq!(Trend::Long.value(), 1);
        assert_eq!(Trend::Long.to_string(), "1");
    }

    #[test]
    fn undefined_signal_has_no_exposure() {
        assert_eq!(Trend::exposure(None), 0.0);
        assert_eq!(Trend::exposure(Some(Trend::Flat)), 0.0);
        assert_eq!(Trend::exposure(Some(Trend::Long)), 1.0);
    }

    #[test]
    fn warmup_leaves_signal_undefined() {
        let prices = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let ind = build_indicators(&prices, 2, 4);

        assert_eq!(ind.len(), 5);
        assert!(ind.short_avg[0].is_none());
        assert!(ind.short_avg[1].is_some());
        assert!(ind.long_avg[2].is_none());
        assert!(ind.long_avg[3].is_some());
        assert_eq!(&ind.trend_signal[..3], &[None, None, None]);
        assert_eq!(ind.first_signal_index(), Some(3));
    }

    #[test]
    fn rising_prices_are_long() {
        let prices = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let ind = build_indicators(&prices, 2, 4);

        // short(3,4)=3.5 > long(1..4)=2.5
        assert_eq!(ind.trend_signal[3], Some(Trend::Long));
        assert_eq!(ind.trend_signal[4], Some(Trend::Long));
    }

    #[test]
    fn falling_prices_are_flat() {
        let prices = make_series(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let ind = build_indicators(&prices, 2, 4);

        assert_eq!(ind.trend_signal[3], Some(Trend::Flat));
        assert_eq!(ind.trend_signal[4], Some(Trend::Flat));
    }

    #[test]
    fn equal_averages_are_flat() {
        let prices = make_series(&[10.0; 6]);
        let ind = build_indicators(&prices, 2, 3);

        assert_eq!(ind.short_avg[5], ind.long_avg[5]);
        assert_eq!(ind.trend_signal[5], Some(Trend::Flat));
    }

    #[test]
    fn series_shorter_than_long_window_has_no_signal() {
        let prices = make_series(&[1.0, 2.0, 3.0]);
        let ind = build_indicators(&prices, 2, 5);

        assert!(ind.trend_signal.iter().all(Option::is_none));
        assert_eq!(ind.first_signal_index(), None);
    }
}
