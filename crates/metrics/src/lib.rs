//! # Return Metrics Calculator
//!
//! A library of pure, deterministic functions over a snapshot series: CAGR,
//! time-weighted rate of return, Modified Dietz, money-weighted rate of
//! return (via a secant solve) and annualized standard deviation.
//!
//! ## Architectural Principles
//!
//! - **Stateless Calculation:** the [`MetricsEngine`] holds no state; it
//!   takes snapshot series as input and produces numbers or structured
//!   errors as output.
//! - **No fabricated values:** a metric that cannot be computed is reported
//!   as an error (and surfaces as an absent field), never as a zero or NaN
//!   that could be mistaken for a real result.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricsEngine;
pub use error::MetricsError;
