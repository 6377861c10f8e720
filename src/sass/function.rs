use ast::expression::{Expression, Unit};
use ast::number_value::NumberValue;
use error::{Result, SassError, ErrorKind};
use sass::color_value::ColorValue;

const BUILTINS: [&'static str; 36] = [
    "rgb", "rgba", "red", "green", "blue", "alpha", "opacity",
    "lighten", "darken", "saturate", "desaturate", "adjust-hue", "mix",
    "percentage", "round", "ceil", "floor", "abs", "min", "max",
    "unit", "unitless", "comparable", "type-of",
    "quote", "unquote", "to-upper-case", "to-lower-case", "str-length",
    "length", "nth", "join", "append", "index",
    "if", "not",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Evaluates a built-in function over already evaluated arguments.
/// `Ok(None)` means the name is not a built-in.
pub fn call_builtin(name: &str, args: &[Expression]) -> Result<Option<Expression>> {
    let call = Call { name: name, args: args };
    let result = match name {
        "rgb" => {
            call.arity(3, 3)?;
            color(ColorValue::from_rgba(call.channel(0)?, call.channel(1)?, call.channel(2)?, 1.0))
        },
        "rgba" => {
            if args.len() == 2 {
                let mut c = call.color(0)?.clone();
                c.alpha = call.fraction(1)?;
                c.original = None;
                color(c)
            } else {
                call.arity(4, 4)?;
                color(ColorValue::from_rgba(
                    call.channel(0)?, call.channel(1)?, call.channel(2)?, call.fraction(3)?,
                ))
            }
        },
        "red" => { call.arity(1, 1)?; number(call.color(0)?.red as f64) },
        "green" => { call.arity(1, 1)?; number(call.color(0)?.green as f64) },
        "blue" => { call.arity(1, 1)?; number(call.color(0)?.blue as f64) },
        "alpha" | "opacity" => { call.arity(1, 1)?; number(call.color(0)?.alpha) },
        "lighten" | "darken" | "saturate" | "desaturate" | "adjust-hue" => {
            call.arity(2, 2)?;
            let c = call.color(0)?;
            let amount = call.number(1)?.scalar;
            color(match name {
                "lighten" => c.adjust_hsl(0.0, 0.0, amount),
                "darken" => c.adjust_hsl(0.0, 0.0, -amount),
                "saturate" => c.adjust_hsl(0.0, amount, 0.0),
                "desaturate" => c.adjust_hsl(0.0, -amount, 0.0),
                _ => c.adjust_hsl(amount, 0.0, 0.0),
            })
        },
        "mix" => {
            call.arity(2, 3)?;
            let weight = if args.len() == 3 { call.number(2)?.scalar / 100.0 } else { 0.5 };
            color(call.color(0)?.mix(call.color(1)?, weight))
        },
        "percentage" => {
            call.arity(1, 1)?;
            let n = call.number(0)?;
            if n.unit.is_some() {
                return Err(call.invalid(format!("expected a unitless number, got {}", n)))
            }
            Unit::Number(NumberValue::with_units(n.scalar * 100.0, "%")).into()
        },
        "round" | "ceil" | "floor" | "abs" => {
            call.arity(1, 1)?;
            let mut n = call.number(0)?.clone();
            n.scalar = match name {
                "round" => n.scalar.round(),
                "ceil" => n.scalar.ceil(),
                "floor" => n.scalar.floor(),
                _ => n.scalar.abs(),
            };
            Unit::Number(n).into()
        },
        "min" | "max" => {
            if args.is_empty() {
                return Err(call.invalid(String::from("expected at least one argument")))
            }
            let mut best = call.number(0)?;
            for i in 1..args.len() {
                let n = call.number(i)?;
                if !best.is_comparable(n) {
                    return Err(SassError::new(
                        ErrorKind::IncompatibleUnits,
                        format!("{}: incompatible units {} and {}", name, best, n),
                    ))
                }
                if (name == "min" && n.scalar < best.scalar) || (name == "max" && n.scalar > best.scalar) {
                    best = n;
                }
            }
            Unit::Number(best.clone()).into()
        },
        "unit" => {
            call.arity(1, 1)?;
            Unit::Str(call.number(0)?.unit_string().to_string()).into()
        },
        "unitless" => {
            call.arity(1, 1)?;
            Expression::boolean(call.number(0)?.unit.is_none())
        },
        "comparable" => {
            call.arity(2, 2)?;
            Expression::boolean(call.number(0)?.is_comparable(call.number(1)?))
        },
        "type-of" => {
            call.arity(1, 1)?;
            Expression::ident(type_of(&args[0]))
        },
        "quote" => { call.arity(1, 1)?; Unit::Str(args[0].unquoted()).into() },
        "unquote" => { call.arity(1, 1)?; Unit::Ident(args[0].unquoted()).into() },
        "to-upper-case" | "to-lower-case" => {
            call.arity(1, 1)?;
            let text = args[0].unquoted();
            let text = if name == "to-upper-case" { text.to_uppercase() } else { text.to_lowercase() };
            match args[0].units.as_slice() {
                [Unit::Str(..)] => Unit::Str(text).into(),
                _ => Unit::Ident(text).into(),
            }
        },
        "str-length" => {
            call.arity(1, 1)?;
            number(args[0].unquoted().chars().count() as f64)
        },
        "length" => {
            call.arity(1, 1)?;
            number(args[0].list_items().len() as f64)
        },
        "nth" => {
            call.arity(2, 2)?;
            let items = args[0].list_items();
            let n = call.integer(1)?;
            let index = if n > 0 {
                (n - 1) as usize
            } else if n < 0 && n.unsigned_abs() <= items.len() as u64 {
                items.len() - n.unsigned_abs() as usize
            } else {
                items.len()
            };
            match items.into_iter().nth(index) {
                Some(item) => item,
                None => return Err(call.invalid(format!("index {} is out of bounds for `{}`", n, args[0]))),
            }
        },
        "join" => {
            call.arity(2, 3)?;
            let separator = call.separator(2)?;
            let comma = list_is_comma(&args[0], &args[1], separator.as_ref().map(|s| &s[..]));
            let mut items = args[0].list_items();
            items.extend(args[1].list_items());
            Expression::from_items(items, comma)
        },
        "append" => {
            call.arity(2, 3)?;
            let separator = call.separator(2)?;
            let comma = list_is_comma(&args[0], &args[0], separator.as_ref().map(|s| &s[..]));
            let mut items = args[0].list_items();
            items.push(args[1].clone());
            Expression::from_items(items, comma)
        },
        "index" => {
            call.arity(2, 2)?;
            match args[0].list_items().iter().position(|item| *item == args[1]) {
                Some(pos) => number((pos + 1) as f64),
                None => Expression::ident("null"),
            }
        },
        "if" => {
            call.arity(3, 3)?;
            if is_truthy(&args[0]) { args[1].clone() } else { args[2].clone() }
        },
        "not" => {
            call.arity(1, 1)?;
            Expression::boolean(!is_truthy(&args[0]))
        },
        _ => return Ok(None),
    };
    debug!("built-in {} returned {}", name, result);
    Ok(Some(result))
}

/// Whether the result of combining two lists is comma separated. `separator`
/// is `comma`, `space` or absent to follow the first list that has more than
/// one item.
pub fn list_is_comma(list: &Expression, other: &Expression, separator: Option<&str>) -> bool {
    match separator {
        Some("comma") => true,
        Some("space") => false,
        _ => {
            if list.list_items().len() > 1 {
                list.is_comma_list()
            } else {
                other.is_comma_list()
            }
        },
    }
}

pub fn is_truthy(value: &Expression) -> bool {
    match value.units.as_slice() {
        [] => false,
        [Unit::Ident(ref s)] => s != "false" && s != "null",
        _ => true,
    }
}

fn type_of(value: &Expression) -> &'static str {
    match value.units.as_slice() {
        [Unit::Number(..)] => "number",
        [Unit::Color(..)] => "color",
        [Unit::Str(..)] => "string",
        [Unit::Ident(ref s)] if s == "true" || s == "false" => "bool",
        [Unit::Ident(ref s)] if s == "null" => "null",
        [Unit::List(..)] => "list",
        [_] => "string",
        _ => "list",
    }
}

fn number(scalar: f64) -> Expression {
    Expression::number(scalar)
}

fn color(c: ColorValue) -> Expression {
    Expression::single(Unit::Color(c))
}

struct Call<'a> {
    name: &'a str,
    args: &'a [Expression],
}

impl<'a> Call<'a> {
    fn invalid(&self, message: String) -> SassError {
        SassError::new(ErrorKind::InvalidArguments, format!("{}: {}", self.name, message))
    }

    fn arity(&self, min: usize, max: usize) -> Result<()> {
        if self.args.len() < min || self.args.len() > max {
            let expected = if min == max { min.to_string() } else { format!("{} to {}", min, max) };
            return Err(self.invalid(format!(
                "expected {} argument(s), got {}", expected, self.args.len(),
            )))
        }
        Ok(())
    }

    fn number(&self, i: usize) -> Result<&'a NumberValue> {
        self.args.get(i).and_then(|a| a.as_number()).ok_or_else(|| {
            self.invalid(format!("argument {} is not a number", i + 1))
        })
    }

    fn integer(&self, i: usize) -> Result<i64> {
        self.args.get(i).and_then(|a| a.as_integer()).ok_or_else(|| {
            self.invalid(format!("argument {} is not an integer", i + 1))
        })
    }

    fn color(&self, i: usize) -> Result<&'a ColorValue> {
        match self.args.get(i).map(|a| a.units.as_slice()) {
            Some([Unit::Color(ref c)]) => Ok(c),
            _ => Err(self.invalid(format!("argument {} is not a color", i + 1))),
        }
    }

    /// A color channel; percentages scale to 0..255.
    fn channel(&self, i: usize) -> Result<f64> {
        let n = self.number(i)?;
        Ok(match n.unit {
            Some(ref u) if u == "%" => n.scalar * 255.0 / 100.0,
            _ => n.scalar,
        })
    }

    fn fraction(&self, i: usize) -> Result<f64> {
        let n = self.number(i)?;
        Ok(match n.unit {
            Some(ref u) if u == "%" => n.scalar / 100.0,
            _ => n.scalar,
        })
    }

    fn separator(&self, i: usize) -> Result<Option<String>> {
        match self.args.get(i) {
            None => Ok(None),
            Some(arg) => match &arg.unquoted()[..] {
                "auto" => Ok(None),
                s @ "comma" | s @ "space" => Ok(Some(s.to_string())),
                other => Err(self.invalid(format!("unknown separator `{}`", other))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::expression::Expression;
    use error::ErrorKind;

    fn call(name: &str, args: &[&str]) -> Result<Option<Expression>> {
        let args = args.iter().map(|a| a.parse().unwrap()).collect::<Vec<Expression>>();
        call_builtin(name, &args)
    }

    fn text(name: &str, args: &[&str]) -> String {
        call(name, args).unwrap().unwrap().to_string()
    }

    #[test]
    fn it_returns_color_for_rgb() {
        assert_eq!("#0a6449", text("rgb", &["10", "100", "73"]));
        assert_eq!("rgba(0, 0, 0, 0.5)", text("rgba", &["#000", "0.5"]));
    }

    #[test]
    fn it_adjusts_colors() {
        assert_eq!("#ff6666", text("lighten", &["#f00", "20%"]));
        assert_eq!("#990000", text("darken", &["#f00", "20%"]));
        assert_eq!("255", text("red", &["#f00"]));
    }

    #[test]
    fn it_works_with_numbers() {
        assert_eq!("50%", text("percentage", &["0.5"]));
        assert_eq!("3px", text("round", &["2.6px"]));
        assert_eq!("1px", text("min", &["3px", "1px", "2px"]));
        assert_eq!("\"px\"", text("unit", &["3px"]));
        assert_eq!("true", text("unitless", &["3"]));
    }

    #[test]
    fn it_works_with_lists() {
        assert_eq!("3", text("length", &["a, b, c"]));
        assert_eq!("b", text("nth", &["a b c", "2"]));
        assert_eq!("c", text("nth", &["a b c", "-1"]));
        assert_eq!("a, b, c", text("join", &["a, b", "c"]));
        assert_eq!("a b c", text("append", &["a b", "c"]));
        assert_eq!("2", text("index", &["a b c", "b"]));
        assert_eq!("null", text("index", &["a b c", "d"]));
    }

    #[test]
    fn it_works_with_strings() {
        assert_eq!("\"bar\"", text("quote", &["bar"]));
        assert_eq!("bar", text("unquote", &["\"bar\""]));
        assert_eq!("\"BAR\"", text("to-upper-case", &["\"bar\""]));
        assert_eq!("string", text("type-of", &["\"bar\""]));
    }

    #[test]
    fn it_reports_misuse() {
        assert_eq!(ErrorKind::InvalidArguments, call("rgb", &["1", "2"]).unwrap_err().kind);
        assert_eq!(ErrorKind::InvalidArguments, call("nth", &["a b", "5"]).unwrap_err().kind);
        assert_eq!(ErrorKind::InvalidArguments, call("nth", &["a b", "-9223372036854775808"]).unwrap_err().kind);
        assert_eq!(ErrorKind::InvalidArguments, call("red", &["blue"]).unwrap_err().kind);
    }

    #[test]
    fn it_does_not_handle_unknown_names() {
        assert_eq!(Ok(None), call("double", &["5"]));
        assert!(!is_builtin("double"));
    }
}
