//! Numeric field values.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::conditions::Condition;

/// A number stored in a record field: an exact integer or an inexact real.
///
/// Reals are wrapped in [`OrderedFloat`] so numbers are `Eq + Hash` and can
/// serve as map keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Number {
    FixedInteger(i64),
    Real(OrderedFloat<f64>),
}

impl Number {
    /// Converts the number to a zero-based position, for indexed access.
    pub fn to_index(self) -> Result<usize, Condition> {
        match self {
            Self::FixedInteger(i) => {
                usize::try_from(i).map_err(|_| Condition::type_error("index", "negative integer"))
            }
            Self::Real(_) => Err(Condition::type_error("index", "real")),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self::FixedInteger(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Self::Real(OrderedFloat(f))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedInteger(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_index() {
        assert_eq!(Number::FixedInteger(2).to_index(), Ok(2));
        assert!(Number::FixedInteger(-1).to_index().is_err());
        assert!(Number::from(1.0).to_index().is_err());
    }
}
