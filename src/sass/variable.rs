use ast::expression::Expression;

use std::fmt;

/// A `$name: value` binding. Also used as a formal parameter, where `value`
/// holds the default (empty when there is none).
#[derive(Clone, Debug, PartialEq)]
pub struct SassVariable {
    pub name: String,
    pub value: Expression,
    pub guarded: bool,
}

impl SassVariable {
    pub fn new<S: Into<String>>(name: S, value: Expression) -> SassVariable {
        SassVariable {
            name: name.into(),
            value: value,
            guarded: false,
        }
    }

    pub fn guarded<S: Into<String>>(name: S, value: Expression) -> SassVariable {
        SassVariable { guarded: true, ..SassVariable::new(name, value) }
    }

    pub fn parameter<S: Into<String>>(name: S) -> SassVariable {
        SassVariable::new(name, Expression::default())
    }

    pub fn default_value(&self) -> Option<&Expression> {
        if self.value.is_empty() { None } else { Some(&self.value) }
    }
}

impl fmt::Display for SassVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "${}: {}", self.name, self.value)?;
        if self.guarded {
            write!(f, " !default")?;
        }
        Ok(())
    }
}
