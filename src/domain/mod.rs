//! Core domain types and logic.

pub mod price_series;
pub mod momentum;
pub mod strategy;
pub mod universe;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
