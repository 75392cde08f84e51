//! smacross: dual moving-average crossover backtester.
//!
//! Hexagonal architecture: the four-stage pipeline lives in [`domain`], port
//! traits in [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
