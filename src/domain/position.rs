//! Position tracker: turns the trend signal into buy/sell/hold events.

use std::fmt;

use tracing::debug;

use super::indicator::{IndicatorSeries, Trend};
use super::price::PriceSeries;

/// Day-over-day change of the trend signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionDelta {
    Buy,
    Sell,
    Hold,
}

impl PositionDelta {
    pub fn value(self) -> i8 {
        match self {
            PositionDelta::Buy => 1,
            PositionDelta::Sell => -1,
            PositionDelta::Hold => 0,
        }
    }

    fn between(prev: Trend, curr: Trend) -> Self {
        match curr.value() - prev.value() {
            1 => PositionDelta::Buy,
            -1 => PositionDelta::Sell,
            _ => PositionDelta::Hold,
        }
    }
}

impl fmt::Display for PositionDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionDelta::Buy => write!(f, "Buy"),
            PositionDelta::Sell => write!(f, "Sell"),
            PositionDelta::Hold => write!(f, "Hold"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionSeries<'a> {
    pub prices: &'a PriceSeries,
    pub position_delta: Vec<Option<PositionDelta>>,
}

impl PositionSeries<'_> {
    pub fn is_buy_signal(&self, index: usize) -> bool {
        self.position_delta[index] == Some(PositionDelta::Buy)
    }

    pub fn is_sell_signal(&self, index: usize) -> bool {
        self.position_delta[index] == Some(PositionDelta::Sell)
    }

    pub fn buy_count(&self) -> usize {
        (0..self.position_delta.len())
            .filter(|&i| self.is_buy_signal(i))
            .count()
    }

    pub fn sell_count(&self) -> usize {
        (0..self.position_delta.len())
            .filter(|&i| self.is_sell_signal(i))
            .count()
    }

    /// Position held at the close of each date, rebuilt from the deltas.
    /// The book opens flat and dates without a delta keep what was held.
    pub fn holdings(&self) -> Vec<Trend> {
        let mut held = Trend::Flat;
        self.position_delta
            .iter()
            .map(|delta| {
                held = match delta {
                    Some(PositionDelta::Buy) => Trend::Long,
                    Some(PositionDelta::Sell) => Trend::Flat,
                    Some(PositionDelta::Hold) | None => held,
                };
                held
            })
            .collect()
    }
}

/// Differentiates the trend signal.
///
/// The first date has no delta. A date still inside the warm-up window has
/// no delta either. Once the signal is defined, an undefined previous
/// signal counts as flat, so leaving warm-up can produce a buy but never a
/// sell.
pub fn track_positions<'a>(indicators: &IndicatorSeries<'a>) -> PositionSeries<'a> {
    let signal = &indicators.trend_signal;
    let mut position_delta = Vec::with_capacity(signal.len());

    for (i, current) in signal.iter().enumerate() {
        let delta = match (i, current) {
            (0, _) | (_, None) => None,
            (_, Some(curr)) => {
                let prev = signal[i - 1].unwrap_or(Trend::Flat);
                Some(PositionDelta::between(prev, *curr))
            }
        };
        position_delta.push(delta);
    }

    let series = PositionSeries {
        prices: indicators.prices,
        position_delta,
    };

    debug!(
        buys = series.buy_count(),
        sells = series.sell_count(),
        "positions tracked"
    );

    series
}
