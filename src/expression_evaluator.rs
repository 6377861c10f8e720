use ast::expression::{Expression, Unit};
use error::{Result, SassError, ErrorKind};
use operator::Op;
use sass::color_value::ColorValue;

/// True when the chain needs arithmetic. Must run before variables are
/// substituted: a `/` only divides when it touches a variable, a function
/// call or a parenthesized group, so that `font: 12px/1.5` stays literal.
pub fn contains_arithmetic_operator(expr: &Expression) -> bool {
    let units = &expr.units;
    units.iter().enumerate().any(|(i, unit)| match *unit {
        Unit::Operator(Op::Slash) => {
            let before = if i > 0 { units.get(i - 1) } else { None };
            let after = units.get(i + 1);
            divides(before) || divides(after)
        },
        Unit::Operator(Op::Comma) | Unit::Operator(Op::RightParen) => false,
        Unit::Operator(_) => true,
        _ => false,
    })
}

fn divides(neighbour: Option<&Unit>) -> bool {
    match neighbour {
        Some(&Unit::Variable(..)) |
        Some(&Unit::Function(..)) |
        Some(&Unit::Operator(Op::LeftParen)) |
        Some(&Unit::Operator(Op::RightParen)) => true,
        _ => false,
    }
}

/// Shunting-yard reduction of one comma-free segment.
pub struct ExpressionEvaluator {
    pub paren_level: i32,
    last_was_an_operator: bool,
    negate_next: bool,
    pending_comma: bool,
    value_stack: Vec<Expression>,
    op_stack: Vec<Op>,
    groups: Vec<Group>,
}

/// What to do with a parenthesized group once it closes.
#[derive(Debug)]
struct Group {
    joins_previous: bool,
    negated: bool,
    has_comma: bool,
    values_below: usize,
}

impl ExpressionEvaluator {
    /// Reduces every comma separated item of `expr` on its own.
    pub fn evaluate(expr: Expression) -> Result<Expression> {
        let items = expr.split_arguments();
        let comma = expr.has_top_level_comma();
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let evaluator = ExpressionEvaluator::new();
            results.push(evaluator.evaluate_list(item.units)?);
        }
        Ok(Expression::from_items(results, comma))
    }

    pub fn new() -> ExpressionEvaluator {
        ExpressionEvaluator {
            paren_level: 0,
            last_was_an_operator: true,
            negate_next: false,
            pending_comma: false,
            value_stack: Vec::new(),
            op_stack: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn evaluate_list(mut self, units: Vec<Unit>) -> Result<Expression> {
        for part in units.into_iter() {
            debug!("Processing unit {:?}", part);

            match part {
                Unit::Operator(Op::LeftParen) => {
                    self.groups.push(Group {
                        joins_previous: !self.last_was_an_operator,
                        negated: self.negate_next,
                        has_comma: false,
                        values_below: self.value_stack.len(),
                    });
                    self.negate_next = false;
                    self.op_stack.push(Op::LeftParen);
                    self.last_was_an_operator = true;
                    self.paren_level += 1;
                },
                Unit::Operator(Op::RightParen) => {
                    self.do_math_until_left_paren()?;
                    self.op_stack.pop();
                    self.paren_level -= 1;
                    self.close_group()?;
                    self.last_was_an_operator = false;
                },
                Unit::Operator(Op::Comma) => {
                    self.do_math_until_left_paren()?;
                    if let Some(group) = self.groups.last_mut() {
                        group.has_comma = true;
                    }
                    self.pending_comma = true;
                    self.last_was_an_operator = true;
                },
                Unit::Operator(Op::Minus) if self.last_was_an_operator => {
                    self.negate_next = !self.negate_next;
                },
                Unit::Operator(Op::Plus) if self.last_was_an_operator => {},
                Unit::Operator(op) => {
                    while let Some(&last) = self.op_stack.last() {
                        if last != Op::LeftParen && last.same_or_greater_precedence(op) {
                            self.math_machine()?;
                        } else {
                            break;
                        }
                    }
                    debug!("Push on op stack {:?}", op);
                    self.op_stack.push(op);
                    self.last_was_an_operator = true;
                },
                other => {
                    let negate = self.negate_next;
                    self.negate_next = false;
                    let value = if negate { negate_unit(other) } else { other };
                    self.push_on_value_stack(Expression::single(value));
                },
            }
        }

        debug!("Op stack = {:?}", self.op_stack);
        debug!("Value stack = {:?}", self.value_stack);

        while let Some(&op) = self.op_stack.last() {
            if op == Op::LeftParen {
                return Err(SassError::new(
                    ErrorKind::InvalidValue,
                    String::from("Expected `)` to close the parenthesis"),
                ))
            }
            self.math_machine()?;
        }

        let mut values = self.value_stack.into_iter();
        let mut result = values.next().unwrap_or_default();
        for rest in values {
            result.units.extend(rest.units);
        }
        Ok(result)
    }

    fn push_on_value_stack(&mut self, expr: Expression) {
        let joins = !self.last_was_an_operator || self.pending_comma;
        match (joins, self.value_stack.pop()) {
            (true, Some(mut previous)) => {
                if self.pending_comma {
                    previous.units.push(Unit::Operator(Op::Comma));
                }
                previous.units.extend(expr.units);
                self.value_stack.push(previous);
            },
            (_, previous) => {
                if let Some(previous) = previous {
                    self.value_stack.push(previous);
                }
                self.value_stack.push(expr);
            },
        }
        self.pending_comma = false;
        self.last_was_an_operator = false;
    }

    fn close_group(&mut self) -> Result<()> {
        let group = match self.groups.pop() {
            Some(g) => g,
            None => return Err(SassError::new(
                ErrorKind::InvalidValue,
                String::from("Unexpected `)`"),
            )),
        };
        self.pending_comma = false;
        if self.value_stack.len() <= group.values_below {
            return Ok(())
        }
        let mut value = self.value_stack.pop().unwrap_or_default();
        if group.has_comma {
            value = Expression::single(Unit::List(value));
        }
        if group.negated {
            value.units = value.units.into_iter().map(negate_unit).collect();
        }
        if group.joins_previous {
            if let Some(mut previous) = self.value_stack.pop() {
                previous.units.extend(value.units);
                value = previous;
            }
        }
        self.value_stack.push(value);
        Ok(())
    }

    fn do_math_until_left_paren(&mut self) -> Result<()> {
        while let Some(&op) = self.op_stack.last() {
            if op == Op::LeftParen {
                break;
            }
            self.math_machine()?;
        }
        Ok(())
    }

    fn math_machine(&mut self) -> Result<()> {
        let op = self.get_operator()?;
        let second = self.get_value()?;
        let first = self.get_value()?;

        let math_result = apply_math(op, first, second)?;
        debug!("Math result: {:?}", math_result);

        self.value_stack.push(math_result);
        Ok(())
    }

    fn get_operator(&mut self) -> Result<Op> {
        self.op_stack.pop().ok_or_else(|| SassError::new(
            ErrorKind::InvalidValue,
            String::from("Expected an operator"),
        ))
    }

    fn get_value(&mut self) -> Result<Expression> {
        self.value_stack.pop().ok_or_else(|| SassError::new(
            ErrorKind::InvalidValue,
            String::from("Expected an operand on both sides of the operator"),
        ))
    }
}

/// Applies `op` between the last unit of `first` and the first unit of
/// `second`; the remaining units stay a space list around the result.
fn apply_math(op: Op, first: Expression, second: Expression) -> Result<Expression> {
    let mut left = first.units;
    let mut right = second.units.into_iter();

    let (a, b) = match (left.pop(), right.next()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(SassError::new(
            ErrorKind::InvalidValue,
            format!("Expected an operand on both sides of `{}`", op),
        )),
    };
    left.push(apply_unit_math(op, a, b)?);
    left.extend(right);
    Ok(Expression::new(left))
}

fn apply_unit_math(op: Op, a: Unit, b: Unit) -> Result<Unit> {
    match (a, b) {
        (Unit::Number(x), Unit::Number(y)) => Ok(Unit::Number(x.apply_math(op, y)?)),
        (Unit::Color(c), Unit::Number(n)) if n.unit.is_none() => {
            let channel = |v: i32| op.math(v as f64, n.scalar);
            Ok(Unit::Color(ColorValue::from_rgba(
                channel(c.red), channel(c.green), channel(c.blue), c.alpha,
            )))
        },
        (Unit::Color(c), Unit::Color(d)) => {
            let channel = |v: i32, w: i32| op.math(v as f64, w as f64);
            Ok(Unit::Color(ColorValue::from_rgba(
                channel(c.red, d.red), channel(c.green, d.green), channel(c.blue, d.blue), c.alpha,
            )))
        },
        (a, b) => concatenate(op, a, b),
    }
}

/// The fallback for operands that are not both numeric.
fn concatenate(op: Op, a: Unit, b: Unit) -> Result<Unit> {
    let quoted = match (&a, &b) {
        (&Unit::Str(..), _) => true,
        _ => false,
    };
    match op {
        Op::Plus if quoted => Ok(Unit::Str(format!("{}{}", a.unquoted(), b.unquoted()))),
        Op::Plus => match b {
            Unit::Str(ref s) => Ok(Unit::Ident(format!("{}{}", a.unquoted(), s))),
            _ => Ok(Unit::Ident(format!("{}{}", a, b))),
        },
        Op::Minus => Ok(Unit::Ident(format!("{}-{}", a, b))),
        Op::Slash => Ok(Unit::Ident(format!("{}/{}", a, b))),
        _ => Err(SassError::new(
            ErrorKind::InvalidValue,
            format!("Undefined operation: `{} {} {}`", a, op, b),
        )),
    }
}

fn negate_unit(unit: Unit) -> Unit {
    match unit {
        Unit::Number(mut nv) => {
            nv.scalar = -nv.scalar;
            Unit::Number(nv)
        },
        other => Unit::Ident(format!("-{}", other)),
    }
}
