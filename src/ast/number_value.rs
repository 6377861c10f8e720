use operator::Op;
use error::{Result, SassError, ErrorKind};

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct NumberValue {
    pub scalar: f64,
    pub unit:   Option<String>,
}

impl NumberValue {
    pub fn from_scalar(num: f64) -> NumberValue {
        NumberValue {
            scalar: num,
            unit:   None,
        }
    }

    pub fn with_units<S: Into<String>>(num: f64, unit: S) -> NumberValue {
        NumberValue {
            scalar: num,
            unit:   Some(unit.into()),
        }
    }

    pub fn unit_string(&self) -> &str {
        match self.unit {
            Some(ref u) => u,
            None        => "",
        }
    }

    /// The scalar as an integer, when it has no unit and no fractional part.
    pub fn as_integer(&self) -> Option<i64> {
        if self.unit.is_none() && self.scalar.fract() == 0.0 && self.scalar.is_finite() {
            Some(self.scalar as i64)
        } else {
            None
        }
    }

    pub fn is_comparable(&self, other: &NumberValue) -> bool {
        match (&self.unit, &other.unit) {
            (&Some(ref u1), &Some(ref u2)) => u1 == u2,
            _ => true,
        }
    }

    pub fn apply_math(self, op: Op, nv: NumberValue) -> Result<NumberValue> {
        let result       = op.math(self.scalar, nv.scalar);
        let result_units = self.compute_units(op, nv)?;

        Ok(NumberValue {
            scalar: result,
            unit:   result_units,
        })
    }

    fn compute_units(self, op: Op, nv: NumberValue) -> Result<Option<String>> {
        let unit = match (self.unit, nv.unit) {
            (Some(u), None) | (None, Some(u)) => Some(u),
            (Some(ref u1), Some(ref u2)) if u1 == u2 => {
                match op {
                    Op::Slash => None, // Divide out the units
                    Op::Star => return Err(SassError::new(
                        ErrorKind::InvalidSquareUnits,
                        format!(
                            "Multiplication of {:?} and {:?} would produce invalid squared units",
                            u1, u2
                        ),
                    )),
                    _ => Some(u1.clone()),
                }
            },
            (None, None) => None,
            (other1, other2) => {
                return Err(SassError::new(
                    ErrorKind::IncompatibleUnits,
                    format!("Incompatible units: {:?} and {:?}", other1, other2),
                ));
            },
        };
        Ok(unit)
    }
}

/// Formats a scalar the way stylesheets expect it: no trailing zeroes and at
/// most five decimal places.
pub fn format_scalar(scalar: f64) -> String {
    if scalar.fract() == 0.0 && scalar.abs() < 1e15 {
        return format!("{}", scalar as i64);
    }
    let fixed = format!("{:.5}", scalar);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        String::from("0")
    } else {
        trimmed.to_string()
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", format_scalar(self.scalar), self.unit_string())
    }
}
