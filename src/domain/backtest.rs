//! Pipeline entry point: indicators → positions → simulation → metrics.
//!
//! All validation happens here. Once the inputs pass, every stage is a
//! total function over its predecessor's output.

use tracing::info;

use super::error::SmaCrossError;
use super::indicator::{build_indicators, IndicatorSeries};
use super::metrics::Metrics;
use super::portfolio::{simulate, SimulationResult, DEFAULT_INITIAL_CASH};
use super::position::{track_positions, PositionSeries};
use super::price::PriceSeries;
use super::trade_log::{extract_trade_log, TradeLog};

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_cash: f64,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        CrossoverParams {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }
}

impl CrossoverParams {
    pub fn validate(&self) -> Result<(), SmaCrossError> {
        if self.short_window == 0 {
            return Err(SmaCrossError::invalid_parameter(
                "short_window",
                "must be positive",
            ));
        }
        if self.long_window == 0 {
            return Err(SmaCrossError::invalid_parameter(
                "long_window",
                "must be positive",
            ));
        }
        if self.short_window >= self.long_window {
            return Err(SmaCrossError::invalid_parameter(
                "short_window",
                format!(
                    "must be less than long_window ({} >= {})",
                    self.short_window, self.long_window
                ),
            ));
        }
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(SmaCrossError::invalid_parameter(
                "initial_cash",
                "must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Every stage's output for one run, index-aligned by date.
#[derive(Debug, Clone)]
pub struct BacktestRun<'a> {
    pub params: CrossoverParams,
    pub indicators: IndicatorSeries<'a>,
    pub positions: PositionSeries<'a>,
    pub simulation: SimulationResult<'a>,
    pub metrics: Metrics,
    pub trade_log: TradeLog,
}

impl<'a> BacktestRun<'a> {
    pub fn prices(&self) -> &'a PriceSeries {
        self.simulation.prices
    }
}

pub fn run_backtest<'a>(
    prices: &'a PriceSeries,
    params: &CrossoverParams,
) -> Result<BacktestRun<'a>, SmaCrossError> {
    params.validate()?;
    if prices.len() < params.long_window {
        return Err(SmaCrossError::InsufficientData {
            subject: "price series".into(),
            bars: prices.len(),
            minimum: params.long_window,
        });
    }

    let indicators = build_indicators(prices, params.short_window, params.long_window);
    let positions = track_positions(&indicators);
    let simulation = simulate(&positions, params.initial_cash);
    let metrics = Metrics::compute(&simulation)?;
    let trade_log = extract_trade_log(&positions, &simulation);

    info!(
        rows = prices.len(),
        short_window = params.short_window,
        long_window = params.long_window,
        trades = trade_log.len(),
        final_value = metrics.final_portfolio_value,
        "backtest complete"
    );

    Ok(BacktestRun {
        params: params.clone(),
        indicators,
        positions,
        simulation,
        metrics,
        trade_log,
    })
}
