//! Trade log extraction.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::metrics::round2;
use super::portfolio::SimulationResult;
use super::position::{PositionDelta, PositionSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeType {
    Buy,
    Sell,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TradeType::Buy => "Buy",
            TradeType::Sell => "Sell",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLogEntry {
    pub date: NaiveDate,
    pub trade_type: TradeType,
    pub price: f64,
    /// Strategy return on the trade date, in percent, rounded to 2 dp.
    pub return_pct: f64,
}

pub type TradeLog = Vec<TradeLogEntry>;

/// One entry per date with a defined, non-hold position delta, in date order.
pub fn extract_trade_log(positions: &PositionSeries<'_>, simulation: &SimulationResult<'_>) -> TradeLog {
    positions
        .position_delta
        .iter()
        .enumerate()
        .filter_map(|(i, delta)| {
            let trade_type = match delta {
                Some(PositionDelta::Buy) => TradeType::Buy,
                Some(PositionDelta::Sell) => TradeType::Sell,
                Some(PositionDelta::Hold) | None => return None,
            };
            let strategy_return = simulation.strategy_return[i];
            Some(TradeLogEntry {
                date: positions.prices.date(i),
                trade_type,
                price: positions.prices.close(i),
                return_pct: round2(strategy_return * 100.0),
            })
        })
        .collect()
}
