use std::fmt;
use std::str::FromStr;

use super::{CalculatorError, Service};

/// A binary calculator operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Self; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    /// Apply the operation through `service`.
    ///
    /// # Errors
    /// Same as the corresponding [`Service`] method.
    pub fn apply(self, service: &Service, a: i64, b: i64) -> Result<i64, CalculatorError> {
        match self {
            Self::Add => service.add(a, b),
            Self::Subtract => service.subtract(a, b),
            Self::Multiply => service.multiply(a, b),
            Self::Divide => service.divide(a, b),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operation {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(Self::Add),
            "sub" | "subtract" | "-" => Ok(Self::Subtract),
            "mul" | "multiply" | "*" | "x" => Ok(Self::Multiply),
            "div" | "divide" | "/" => Ok(Self::Divide),
            _ => Err(CalculatorError::UnknownOperation(s.to_owned())),
        }
    }
}
