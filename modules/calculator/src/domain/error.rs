use thiserror::Error;

use super::Operation;

/// Errors produced by calculator operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("division by zero: {dividend} / 0")]
    DivisionByZero { dividend: i64 },

    #[error("integer overflow: {a} {op} {b}")]
    Overflow { op: Operation, a: i64, b: i64 },

    #[error("unknown operation '{0}', expected one of add, sub, mul, div")]
    UnknownOperation(String),
}
