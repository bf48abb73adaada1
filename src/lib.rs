//----------------------------------------
// Root lib
//----------------------------------------
//! The purpose of this library is to determine, by simulation, the sample
//! size and decision thresholds of a two-arm randomized trial with two
//! co-primary continuous endpoints analysed under a Bayesian model.
//!
//! Trials are generated with truncated, baseline-adjusted, correlated
//! outcomes, handed to an [`inference::InferenceEngine`] and reduced to
//! operating characteristics (power, assurance, Type I error) with Wilson
//! intervals. On top of that sit a logistic sample size curve, a bisection
//! threshold calibrator and a sequential interim-stopping simulator.

/// Rate estimation over many replicates, with optional result caching
pub mod aggregation;
pub mod calibration;
/// Outcome definitions, effect configurations and the configuration file
pub mod config;
pub mod curve;
pub mod design_prior;
/// This module contains error types
pub mod error;
pub mod evaluation;
pub mod generation;
/// The inference engine seam and a reference engine
pub mod inference;
pub mod sequential;
pub mod study;
pub mod util;

pub use error::CtbayesErr;
pub use study::Study;
