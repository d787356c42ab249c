//! Domain service for the calculator.

use tracing::{debug, instrument};

use super::{CalculatorError, Operation};

/// Stateless calculator service.
#[derive(Debug, Clone, Copy, Default)]
pub struct Service;

impl Service {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    /// `Overflow` if the sum does not fit in `i64`.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&self, a: i64, b: i64) -> Result<i64, CalculatorError> {
        let result = a.checked_add(b).ok_or(CalculatorError::Overflow {
            op: Operation::Add,
            a,
            b,
        })?;
        debug!(result, "Addition completed");
        Ok(result)
    }

    /// # Errors
    /// `Overflow` if the difference does not fit in `i64`.
    #[instrument(level = "debug", skip(self))]
    pub fn subtract(&self, a: i64, b: i64) -> Result<i64, CalculatorError> {
        let result = a.checked_sub(b).ok_or(CalculatorError::Overflow {
            op: Operation::Subtract,
            a,
            b,
        })?;
        debug!(result, "Subtraction completed");
        Ok(result)
    }

    /// # Errors
    /// `Overflow` if the product does not fit in `i64`.
    #[instrument(level = "debug", skip(self))]
    pub fn multiply(&self, a: i64, b: i64) -> Result<i64, CalculatorError> {
        let result = a.checked_mul(b).ok_or(CalculatorError::Overflow {
            op: Operation::Multiply,
            a,
            b,
        })?;
        debug!(result, "Multiplication completed");
        Ok(result)
    }

    /// Integer division, truncating toward zero.
    ///
    /// # Errors
    /// `DivisionByZero` if `b` is zero, `Overflow` for `i64::MIN / -1`.
    #[instrument(level = "debug", skip(self))]
    pub fn divide(&self, a: i64, b: i64) -> Result<i64, CalculatorError> {
        if b == 0 {
            return Err(CalculatorError::DivisionByZero { dividend: a });
        }
        let result = a.checked_div(b).ok_or(CalculatorError::Overflow {
            op: Operation::Divide,
            a,
            b,
        })?;
        debug!(result, "Division completed");
        Ok(result)
    }
}
