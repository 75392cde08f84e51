//! Core domain types and the four-stage crossover pipeline.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod portfolio;
pub mod position;
pub mod price;
pub mod trade_log;
