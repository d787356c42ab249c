//! Four-function integer calculator.
//!
//! All operations are checked: overflow and division by zero are reported as
//! [`CalculatorError`] instead of wrapping or panicking.

#![forbid(unsafe_code)]

pub mod domain;

pub use domain::{CalculatorError, Operation, Service};
