//! End-to-end pipeline tests over synthetic price series.
//!
//! Covers:
//! - Monotone rise produces a single golden cross and no exit
//! - Constant prices leave the portfolio untouched and Sharpe undefined
//! - Hand-computed down-then-up returns
//! - Sharpe, volatility and win % sample every date, the first included
//! - Repeated runs over the same input are identical
//! - Parameter and data-length failures surface as typed errors
//! - Fetching through a price source before running

mod common;

use approx::assert_relative_eq;
use common::*;
use smacross::domain::backtest::{run_backtest, CrossoverParams};
use smacross::domain::error::SmaCrossError;
use smacross::domain::indicator::Trend;
use smacross::domain::position::PositionDelta;
use smacross::domain::trade_log::TradeType;
use smacross::ports::data_port::PriceSource;

fn params(short: usize, long: usize) -> CrossoverParams {
    CrossoverParams {
        short_window: short,
        long_window: long,
        initial_cash: 10_000.0,
    }
}

mod monotone_rise {
    use super::*;

    #[test]
    fn single_buy_at_first_defined_long_average() {
        let prices = linear_series(300, 1.0, 1.0);
        let run = run_backtest(&prices, &CrossoverParams::default()).unwrap();

        assert_eq!(run.positions.buy_count(), 1);
        assert_eq!(run.positions.sell_count(), 0);
        assert!(run.positions.is_buy_signal(199));
        assert_eq!(run.indicators.first_signal_index(), Some(199));
        assert!(run.indicators.trend_signal[..199].iter().all(Option::is_none));
        assert!(run.indicators.trend_signal[199..]
            .iter()
            .all(|s| *s == Some(Trend::Long)));
    }

    #[test]
    fn trade_log_has_one_entry() {
        let prices = linear_series(300, 1.0, 1.0);
        let run = run_backtest(&prices, &CrossoverParams::default()).unwrap();

        assert_eq!(run.trade_log.len(), 1);
        let entry = &run.trade_log[0];
        assert_eq!(entry.trade_type, TradeType::Buy);
        assert_eq!(entry.date, prices.date(199));
        assert_eq!(entry.price, 200.0);
        assert_eq!(entry.return_pct, 0.0);
    }

    #[test]
    fn equity_tracks_price_after_entry() {
        let prices = linear_series(300, 1.0, 1.0);
        let run = run_backtest(&prices, &CrossoverParams::default()).unwrap();

        assert_relative_eq!(run.simulation.portfolio_value[199], 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(
            run.metrics.final_portfolio_value,
            10_000.0 * 300.0 / 200.0,
            max_relative = 1e-9
        );
        assert_eq!(run.metrics.max_drawdown, 0.0);
        assert_relative_eq!(
            run.metrics.win_percentage,
            100.0 * 100.0 / 300.0,
            epsilon = 1e-9
        );
        assert!(run.metrics.sharpe_ratio.unwrap() > 0.0);
    }
}

mod constant_prices {
    use super::*;

    #[test]
    fn portfolio_never_moves() {
        let prices = constant_series(30, 42.0);
        let run = run_backtest(&prices, &params(3, 7)).unwrap();

        assert!(run.simulation.daily_return[1..]
            .iter()
            .all(|r| *r == Some(0.0)));
        assert!(run.simulation.strategy_return.iter().all(|&r| r == 0.0));
        assert_eq!(run.simulation.strategy_return.len(), 30);
        assert!(run
            .simulation
            .portfolio_value
            .iter()
            .all(|&v| v == 10_000.0));
        assert!(run.trade_log.is_empty());
    }

    #[test]
    fn sharpe_is_degenerate() {
        let prices = constant_series(30, 42.0);
        let run = run_backtest(&prices, &params(3, 7)).unwrap();

        assert_eq!(run.metrics.sharpe_ratio, None);
        assert!(matches!(
            run.metrics.sharpe(),
            Err(SmaCrossError::DegenerateVariance { .. })
        ));
        assert_eq!(run.metrics.annualized_volatility, Some(0.0));
        assert_eq!(run.metrics.max_drawdown, 0.0);
        assert_eq!(run.metrics.annualized_return, 0.0);
        assert_eq!(run.metrics.win_percentage, 0.0);
        assert_eq!(run.metrics.loss_percentage, 100.0);

        let rows = run.metrics.report().rows();
        assert_eq!(rows[0], ("Sharpe Ratio", "undefined".to_string()));
    }
}

mod down_then_up {
    use super::*;

    #[test]
    fn daily_returns_match_hand_computation() {
        let prices = series_from_closes(&[100.0, 90.0, 100.0]);
        let run = run_backtest(&prices, &params(1, 2)).unwrap();

        let daily = &run.simulation.daily_return;
        assert_eq!(daily[0], None);
        assert_relative_eq!(daily[1].unwrap(), -0.10, epsilon = 1e-12);
        assert_relative_eq!(daily[2].unwrap(), 0.111_111_111_111, epsilon = 1e-9);
    }

    #[test]
    fn strategy_is_flat_until_crossover() {
        let prices = series_from_closes(&[100.0, 90.0, 100.0]);
        let run = run_backtest(&prices, &params(1, 2)).unwrap();

        // long average: [-, 95, 95]; short (the close): [100, 90, 100]
        assert_eq!(
            run.indicators.trend_signal,
            vec![None, Some(Trend::Flat), Some(Trend::Long)]
        );
        assert_eq!(
            run.positions.position_delta,
            vec![None, Some(PositionDelta::Hold), Some(PositionDelta::Buy)]
        );
        assert_eq!(
            run.simulation.strategy_return,
            vec![0.0, 0.0, 0.0]
        );
        assert_eq!(run.simulation.portfolio_value, vec![10_000.0; 3]);
    }

    #[test]
    fn long_position_earns_following_rebound() {
        let prices = series_from_closes(&[100.0, 110.0, 99.0, 108.9]);
        let run = run_backtest(&prices, &params(1, 2)).unwrap();

        // long average: [-, 105, 104.5, 103.95]
        assert_eq!(
            run.indicators.trend_signal,
            vec![None, Some(Trend::Long), Some(Trend::Flat), Some(Trend::Long)]
        );
        let strat = &run.simulation.strategy_return;
        assert_relative_eq!(strat[2], -0.10, epsilon = 1e-12);
        assert_eq!(strat[3], 0.0);
        assert_relative_eq!(run.metrics.final_portfolio_value, 9_000.0, epsilon = 1e-9);
        assert_relative_eq!(run.metrics.max_drawdown, -0.10, epsilon = 1e-12);

        let types: Vec<TradeType> = run.trade_log.iter().map(|t| t.trade_type).collect();
        assert_eq!(types, vec![TradeType::Buy, TradeType::Sell, TradeType::Buy]);
        assert_eq!(run.trade_log[1].return_pct, -10.0);
    }
}

mod every_date_is_a_sample {
    use super::*;

    // closes 1..=10, windows 2/3: long from t2, so t3..t9 earn c[t]/c[t-1]-1
    fn rising_run_returns() -> Vec<f64> {
        let mut returns = vec![0.0, 0.0, 0.0];
        returns.extend((3..10).map(|t| (t + 1) as f64 / t as f64 - 1.0));
        returns
    }

    #[test]
    fn first_date_return_is_zero() {
        let prices = linear_series(10, 1.0, 1.0);
        let run = run_backtest(&prices, &params(2, 3)).unwrap();

        assert_eq!(run.simulation.strategy_return[0], 0.0);
        for (got, want) in run.simulation.strategy_return.iter().zip(rising_run_returns()) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn win_percentage_divides_by_all_dates() {
        let prices = linear_series(10, 1.0, 1.0);
        let run = run_backtest(&prices, &params(2, 3)).unwrap();

        assert_relative_eq!(run.metrics.win_percentage, 70.0, epsilon = 1e-9);
        assert_relative_eq!(run.metrics.loss_percentage, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn sharpe_and_volatility_use_all_dates() {
        let prices = linear_series(10, 1.0, 1.0);
        let run = run_backtest(&prices, &params(2, 3)).unwrap();

        let returns = rising_run_returns();
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let sd = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();

        assert_relative_eq!(
            run.metrics.sharpe_ratio.unwrap(),
            mean / sd * 252.0_f64.sqrt(),
            epsilon = 1e-9
        );
        assert_relative_eq!(run.metrics.sharpe_ratio.unwrap(), 18.815_028_556_783, epsilon = 1e-6);
        assert_relative_eq!(
            run.metrics.annualized_volatility.unwrap(),
            1.779_960_094_077,
            epsilon = 1e-9
        );
    }
}

mod idempotence {
    use super::*;

    #[test]
    fn repeated_runs_match() {
        let prices = sawtooth_series(15, 6);
        let first = run_backtest(&prices, &params(5, 20)).unwrap();
        let second = run_backtest(&prices, &params(5, 20)).unwrap();

        assert_eq!(first.indicators.short_avg, second.indicators.short_avg);
        assert_eq!(first.indicators.trend_signal, second.indicators.trend_signal);
        assert_eq!(first.positions.position_delta, second.positions.position_delta);
        assert_eq!(first.simulation.portfolio_value, second.simulation.portfolio_value);
        assert_eq!(first.metrics, second.metrics);
        assert_eq!(first.trade_log, second.trade_log);
    }

    #[test]
    fn trades_alternate_on_sawtooth() {
        let prices = sawtooth_series(15, 6);
        let run = run_backtest(&prices, &params(5, 20)).unwrap();

        assert!(run.trade_log.len() >= 2);
        assert_eq!(run.trade_log[0].trade_type, TradeType::Buy);
        for pair in run.trade_log.windows(2) {
            assert_ne!(pair[0].trade_type, pair[1].trade_type);
            assert!(pair[0].date < pair[1].date);
        }
    }
}

mod failures {
    use super::*;

    #[test]
    fn zero_window_is_rejected() {
        let prices = linear_series(10, 1.0, 1.0);
        let err = run_backtest(&prices, &params(0, 5)).unwrap_err();
        assert!(matches!(err, SmaCrossError::InvalidParameter { name, .. } if name == "short_window"));
    }

    #[test]
    fn unordered_windows_are_rejected() {
        let prices = linear_series(10, 1.0, 1.0);
        let err = run_backtest(&prices, &params(5, 5)).unwrap_err();
        assert!(matches!(err, SmaCrossError::InvalidParameter { .. }));
    }

    #[test]
    fn non_positive_cash_is_rejected() {
        let prices = linear_series(10, 1.0, 1.0);
        let mut p = params(2, 4);
        p.initial_cash = 0.0;
        let err = run_backtest(&prices, &p).unwrap_err();
        assert!(matches!(err, SmaCrossError::InvalidParameter { name, .. } if name == "initial_cash"));
    }

    #[test]
    fn series_shorter_than_long_window() {
        let prices = linear_series(199, 1.0, 1.0);
        let err = run_backtest(&prices, &CrossoverParams::default()).unwrap_err();
        match err {
            SmaCrossError::InsufficientData { bars, minimum, .. } => {
                assert_eq!(bars, 199);
                assert_eq!(minimum, 200);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_close_is_rejected_at_construction() {
        let mut points = points_from_closes(&[10.0, 11.0, 12.0]);
        points[1].close = 0.0;
        let err = PriceSeries::new(points).unwrap_err();
        assert!(matches!(err, SmaCrossError::InvalidPriceSeries { .. }));
    }
}

mod with_price_source {
    use super::*;

    #[test]
    fn fetch_then_run() {
        let source =
            MockPriceSource::new().with_points("XOM", points_from_closes(&vec![50.0; 40]));
        let prices = source
            .fetch_prices("XOM", date("2020-01-05"), date("2020-01-30"))
            .unwrap();

        assert_eq!(prices.len(), 26);
        let run = run_backtest(&prices, &params(3, 10)).unwrap();
        assert_eq!(run.simulation.portfolio_value.len(), 26);
    }

    #[test]
    fn missing_code_is_no_data() {
        let source = MockPriceSource::new();
        let err = source
            .fetch_prices("XOM", date("2020-01-01"), date("2020-12-31"))
            .unwrap_err();
        assert!(matches!(err, SmaCrossError::NoData { .. }));
    }

    #[test]
    fn source_error_propagates() {
        let source = MockPriceSource::new().with_error("XOM", "connection refused");
        let err = source
            .fetch_prices("XOM", date("2020-01-01"), date("2020-12-31"))
            .unwrap_err();
        assert!(matches!(err, SmaCrossError::DataSource { reason } if reason == "connection refused"));
    }
}
