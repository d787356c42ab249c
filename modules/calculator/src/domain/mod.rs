//! Domain layer for the calculator.

pub mod error;
pub mod operation;
pub mod service;

pub use error::CalculatorError;
pub use operation::Operation;
pub use service::Service;
