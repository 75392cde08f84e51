//! Performance metrics and statistics.
//!
//! [`Metrics`] keeps full precision. [`MetricsReport`] is the rounded form
//! produced only when results are presented, so rounding never feeds back
//! into the equity curve.

use tracing::debug;

use super::error::SmaCrossError;
use super::portfolio::SimulationResult;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// `None` when the sample standard deviation is zero or undefined.
    pub sharpe_ratio: Option<f64>,
    /// Per-period geometric growth over N dates; N counts samples, not years.
    pub annualized_return: f64,
    pub annualized_volatility: Option<f64>,
    pub win_percentage: f64,
    pub loss_percentage: f64,
    pub max_drawdown: f64,
    pub final_portfolio_value: f64,
}

impl Metrics {
    /// Reduces a simulation to summary statistics. Every date counts as a
    /// sample, including the first one, which never holds a position.
    /// Fails on an empty simulation.
    pub fn compute(simulation: &SimulationResult<'_>) -> Result<Self, SmaCrossError> {
        let returns = &simulation.strategy_return;
        if returns.is_empty() {
            return Err(SmaCrossError::InsufficientData {
                subject: "strategy returns".into(),
                bars: 0,
                minimum: 1,
            });
        }

        let stddev = sample_stddev(returns);
        let sharpe_ratio = match stddev {
            Some(sd) if sd > 0.0 => Some(mean(returns) / sd * TRADING_DAYS_PER_YEAR.sqrt()),
            _ => None,
        };
        let annualized_volatility = stddev.map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt());

        let initial_value = simulation.portfolio_value[0];
        let final_portfolio_value = simulation.final_value();
        let periods = simulation.portfolio_value.len() as f64;
        let annualized_return = (final_portfolio_value / initial_value).powf(1.0 / periods) - 1.0;

        let wins = returns.iter().filter(|&&r| r > 0.0).count();
        let win_percentage = 100.0 * wins as f64 / returns.len() as f64;
        let loss_percentage = 100.0 - win_percentage;

        let metrics = Metrics {
            sharpe_ratio,
            annualized_return,
            annualized_volatility,
            win_percentage,
            loss_percentage,
            max_drawdown: compute_drawdown(returns),
            final_portfolio_value,
        };

        debug!(?metrics, samples = returns.len(), "metrics computed");
        Ok(metrics)
    }

    pub fn sharpe(&self) -> Result<f64, SmaCrossError> {
        self.sharpe_ratio
            .ok_or_else(|| SmaCrossError::DegenerateVariance {
                metric: "sharpe ratio".into(),
            })
    }

    pub fn volatility(&self) -> Result<f64, SmaCrossError> {
        self.annualized_volatility
            .ok_or_else(|| SmaCrossError::DegenerateVariance {
                metric: "annualized volatility".into(),
            })
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            sharpe_ratio: self.sharpe_ratio.map(round2),
            max_drawdown: round2(self.max_drawdown),
            annualized_volatility: self.annualized_volatility.map(round2),
            final_portfolio_value: round2(self.final_portfolio_value),
            annualized_return: round2(self.annualized_return),
            win_percentage: round2(self.win_percentage),
            loss_percentage: round2(self.loss_percentage),
        }
    }
}

/// Report-time rendition of [`Metrics`], every scalar rounded to 2 dp.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub annualized_volatility: Option<f64>,
    pub final_portfolio_value: f64,
    pub annualized_return: f64,
    pub win_percentage: f64,
    pub loss_percentage: f64,
}

impl MetricsReport {
    /// Label/value pairs in display order. Undefined values render as
    /// "undefined" rather than NaN.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let show = |v: Option<f64>| match v {
            Some(v) => format!("{v:.2}"),
            None => "undefined".to_string(),
        };
        vec![
            ("Sharpe Ratio", show(self.sharpe_ratio)),
            ("Max Drawdown", format!("{:.2}", self.max_drawdown)),
            ("Annualized Volatility", show(self.annualized_volatility)),
            (
                "Final Portfolio Value",
                format!("{:.2}", self.final_portfolio_value),
            ),
            ("Annualized Return", format!("{:.2}", self.annualized_return)),
            ("Win Percentage", format!("{:.2}", self.win_percentage)),
            ("Loss Percentage", format!("{:.2}", self.loss_percentage)),
        ]
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Largest peak-to-trough decline of the compounded returns, re-based to
/// 1.0 before the first return. Always <= 0.
fn compute_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = (cumulative - peak) / peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}
