//! Mathematical utilities: least squares fitting.

pub mod ols;

pub use ols::*;
