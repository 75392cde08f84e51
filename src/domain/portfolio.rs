//! Portfolio simulator: one-day-lag execution with fully reinvested equity.

use chrono::NaiveDate;
use tracing::debug;

use super::position::PositionSeries;
use super::price::PriceSeries;

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Index-aligned simulation output.
///
/// `daily_return[0]` is undefined: there is no prior close. Every
/// `strategy_return` is defined; dates without a held position earn 0.
#[derive(Debug, Clone)]
pub struct SimulationResult<'a> {
    pub prices: &'a PriceSeries,
    pub initial_cash: f64,
    pub daily_return: Vec<Option<f64>>,
    pub strategy_return: Vec<f64>,
    pub portfolio_value: Vec<f64>,
}

impl SimulationResult<'_> {
    pub fn final_value(&self) -> f64 {
        self.portfolio_value
            .last()
            .copied()
            .unwrap_or(self.initial_cash)
    }

    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        self.prices
            .points()
            .iter()
            .zip(&self.portfolio_value)
            .map(|(p, &equity)| EquityPoint {
                date: p.date,
                equity,
            })
            .collect()
    }
}

/// Runs the reinvested-equity simulation over the tracked positions.
///
/// The position held at the close of t-1 earns the return from t-1 to t.
/// There is no leverage guard: a single-day loss beyond 100% drives the
/// value below zero.
pub fn simulate<'a>(positions: &PositionSeries<'a>, initial_cash: f64) -> SimulationResult<'a> {
    let prices = positions.prices;
    let holdings = positions.holdings();
    let n = prices.len();

    let mut daily_return = Vec::with_capacity(n);
    let mut strategy_return = Vec::with_capacity(n);
    let mut portfolio_value = Vec::with_capacity(n);

    for i in 0..n {
        if i == 0 {
            daily_return.push(None);
            strategy_return.push(0.0);
            portfolio_value.push(initial_cash);
            continue;
        }

        let ret = prices.close(i) / prices.close(i - 1) - 1.0;
        let strat = f64::from(holdings[i - 1].value()) * ret;

        daily_return.push(Some(ret));
        strategy_return.push(strat);
        portfolio_value.push(portfolio_value[i - 1] * (1.0 + strat));
    }

    let result = SimulationResult {
        prices,
        initial_cash,
        daily_return,
        strategy_return,
        portfolio_value,
    };

    debug!(
        rows = n,
        initial_cash,
        final_value = result.final_value(),
        "portfolio simulated"
    );

    result
}
