use ast::number_value::NumberValue;
use operator::Op;
use sass::color_value::ColorValue;

use std::fmt;

/// One link of an expression chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Number(NumberValue),
    Color(ColorValue),
    Ident(String),
    /// A quoted string; the payload excludes the quotes.
    Str(String),
    Operator(Op),
    /// A `$name` reference; the payload excludes the `$`.
    Variable(String),
    Function(FunctionCall),
    /// A comma list substituted into a function parameter, kept together so
    /// that it stays one argument.
    List(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub parameters: Expression,
}

impl Unit {
    pub fn number(scalar: f64) -> Unit {
        Unit::Number(NumberValue::from_scalar(scalar))
    }

    pub fn ident<S: Into<String>>(s: S) -> Unit {
        Unit::Ident(s.into())
    }

    pub fn is_operator(&self, op: Op) -> bool {
        *self == Unit::Operator(op)
    }

    pub fn is_comma(&self) -> bool {
        self.is_operator(Op::Comma)
    }

    /// The text of the unit with any quotes removed.
    pub fn unquoted(&self) -> String {
        match *self {
            Unit::Str(ref s) => s.clone(),
            ref other => other.to_string(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Unit::Number(ref nv) => nv.fmt(f),
            Unit::Color(ref cv) => cv.fmt(f),
            Unit::Ident(ref s) => write!(f, "{}", s),
            Unit::Str(ref s) => write!(f, "\"{}\"", s),
            Unit::Operator(ref op) => op.fmt(f),
            Unit::Variable(ref name) => write!(f, "${}", name),
            Unit::Function(ref call) => write!(f, "{}({})", call.name, call.parameters),
            Unit::List(ref expr) => expr.fmt(f),
        }
    }
}

/// An ordered chain of units. Top-level commas delimit list items and
/// function arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub units: Vec<Unit>,
}

impl Expression {
    pub fn new(units: Vec<Unit>) -> Expression {
        Expression { units: units }
    }

    pub fn single(unit: Unit) -> Expression {
        Expression { units: vec![unit] }
    }

    pub fn number(scalar: f64) -> Expression {
        Expression::single(Unit::number(scalar))
    }

    pub fn ident<S: Into<String>>(s: S) -> Expression {
        Expression::single(Unit::ident(s))
    }

    pub fn boolean(b: bool) -> Expression {
        Expression::ident(if b { "true" } else { "false" })
    }

    /// Joins list items back into one chain, separated by commas or spaces.
    pub fn from_items(items: Vec<Expression>, comma: bool) -> Expression {
        let mut units = vec![];
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 && comma {
                units.push(Unit::Operator(Op::Comma));
            }
            units.extend(item.units);
        }
        Expression::new(units)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn has_top_level_comma(&self) -> bool {
        self.units.iter().any(|u| u.is_comma())
    }

    /// Splits at top-level commas into independent argument chains. Empty
    /// segments are dropped, so `15 ,` is one argument and `, ,` is none.
    pub fn split_arguments(&self) -> Vec<Expression> {
        let mut args = vec![];
        let mut current = vec![];
        let mut depth = 0;

        for unit in self.units.iter() {
            match *unit {
                Unit::Operator(Op::LeftParen) => depth += 1,
                Unit::Operator(Op::RightParen) => depth -= 1,
                Unit::Operator(Op::Comma) if depth == 0 => {
                    if !current.is_empty() {
                        args.push(Expression::new(current));
                        current = vec![];
                    }
                    continue;
                },
                _ => {},
            }
            current.push(unit.clone());
        }
        if !current.is_empty() {
            args.push(Expression::new(current));
        }
        args
    }

    /// The items of this value seen as a list: comma separated when it has a
    /// top-level comma, otherwise space separated.
    pub fn list_items(&self) -> Vec<Expression> {
        if self.units.len() == 1 {
            if let Unit::List(ref inner) = self.units[0] {
                return inner.list_items()
            }
        }
        if self.has_top_level_comma() {
            self.split_arguments()
        } else {
            self.units.iter().cloned().map(Expression::single).collect()
        }
    }

    pub fn is_comma_list(&self) -> bool {
        match self.units.as_slice() {
            [Unit::List(ref inner)] => inner.is_comma_list(),
            _ => self.has_top_level_comma(),
        }
    }

    pub fn as_number(&self) -> Option<&NumberValue> {
        match self.units.as_slice() {
            [Unit::Number(ref nv)] => Some(nv),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.as_number().and_then(|nv| nv.as_integer())
    }

    /// Text of the value with a single quoted string unwrapped.
    pub fn unquoted(&self) -> String {
        match self.units.as_slice() {
            [ref unit] => unit.unquoted(),
            _ => self.to_string(),
        }
    }
}

impl From<Unit> for Expression {
    fn from(unit: Unit) -> Expression {
        Expression::single(unit)
    }
}

impl From<Vec<Unit>> for Expression {
    fn from(units: Vec<Unit>) -> Expression {
        Expression::new(units)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut output = String::new();
        let mut previous: Option<&Unit> = None;

        for unit in self.units.iter() {
            let glued = match (previous, unit) {
                (None, _) => true,
                (_, &Unit::Operator(Op::Comma)) => true,
                (_, &Unit::Operator(Op::Slash)) => true,
                (_, &Unit::Operator(Op::RightParen)) => true,
                (Some(&Unit::Operator(Op::Slash)), _) => true,
                (Some(&Unit::Operator(Op::LeftParen)), _) => true,
                _ => false,
            };
            if !glued {
                output.push(' ');
            }
            output.push_str(&unit.to_string());
            previous = Some(unit);
        }
        write!(f, "{}", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use operator::Op;

    fn comma() -> Unit {
        Unit::Operator(Op::Comma)
    }

    #[test]
    fn it_splits_arguments_at_top_level_commas() {
        let ex = Expression::new(vec![
            Unit::number(1.0), comma(), Unit::number(2.0), Unit::Operator(Op::Plus),
            Unit::number(3.0), comma(), Unit::ident("a"),
        ]);
        let args = ex.split_arguments();
        assert_eq!(3, args.len());
        assert_eq!("2 + 3", args[1].to_string());
    }

    #[test]
    fn it_drops_empty_argument_segments() {
        assert_eq!(1, Expression::new(vec![Unit::number(15.0), comma()]).split_arguments().len());
        assert_eq!(0, Expression::new(vec![comma(), comma()]).split_arguments().len());
        assert_eq!(1, Expression::new(vec![comma(), Unit::number(15.0)]).split_arguments().len());
        assert_eq!(0, Expression::new(vec![comma()]).split_arguments().len());
        assert_eq!(0, Expression::default().split_arguments().len());
    }

    #[test]
    fn it_keeps_parenthesized_commas_in_one_argument() {
        let ex = Expression::new(vec![
            Unit::Operator(Op::LeftParen), Unit::number(1.0), comma(), Unit::number(2.0),
            Unit::Operator(Op::RightParen), comma(), Unit::number(3.0),
        ]);
        assert_eq!(2, ex.split_arguments().len());
    }

    #[test]
    fn it_leaves_the_original_untouched_when_splitting() {
        let ex = Expression::new(vec![Unit::number(1.0), comma(), Unit::number(2.0)]);
        let before = ex.clone();
        let mut args = ex.split_arguments();
        args[0].units.push(Unit::ident("changed"));
        assert_eq!(before, ex);
    }

    #[test]
    fn it_reads_space_and_comma_lists() {
        let space = Expression::new(vec![Unit::ident("a"), Unit::ident("b"), Unit::ident("c")]);
        assert_eq!(3, space.list_items().len());
        assert!(!space.is_comma_list());

        let commas = Expression::new(vec![
            Unit::ident("a"), Unit::ident("b"), comma(), Unit::ident("c"),
        ]);
        let items = commas.list_items();
        assert_eq!(2, items.len());
        assert_eq!("a b", items[0].to_string());

        let wrapped = Expression::single(Unit::List(commas.clone()));
        assert_eq!(2, wrapped.list_items().len());
        assert!(wrapped.is_comma_list());
    }

    #[test]
    fn it_displays_values_like_css() {
        let ex = Expression::new(vec![
            Unit::Number(NumberValue::with_units(12.0, "px")),
            Unit::Operator(Op::Slash),
            Unit::number(1.5),
            Unit::ident("Helvetica"),
            comma(),
            Unit::Str(String::from("Arial")),
        ]);
        assert_eq!("12px/1.5 Helvetica, \"Arial\"", ex.to_string());

        let call = Expression::single(Unit::Function(FunctionCall {
            name: String::from("translate"),
            parameters: Expression::new(vec![Unit::number(1.0), comma(), Unit::Variable(String::from("y"))]),
        }));
        assert_eq!("translate(1, $y)", call.to_string());
    }
}
