use ast::number_value::format_scalar;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use std::fmt;
use std::result;

static LITERALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]*)"|'(?:[^'\\]|\\.)*'|\d*\.?\d+[a-zA-Z%]*|#[\w-]+|-?[a-zA-Z_][\w-]*"#)
        .expect("condition literal pattern")
});

const KEYWORDS: [&'static str; 6] = ["true", "false", "null", "and", "or", "not"];

/// A value produced by a condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64, Option<String>),
    Str(String),
    Null,
}

impl Literal {
    fn is_truthy(&self) -> bool {
        match *self {
            Literal::Bool(b) => b,
            Literal::Null => false,
            _ => true,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n, ref unit) => {
                write!(f, "{}{}", format_scalar(n), unit.as_ref().map_or("", |u| &u[..]))
            },
            Literal::Str(ref s) => write!(f, "'{}'", escape(s)),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Evaluates the text of an `@if` or `@while` condition once variables have
/// been written into it. Strings arrive single quoted.
pub trait ConditionEvaluator {
    fn evaluate(&self, expression: &str) -> result::Result<Literal, String>;
}

/// Rewrites string literals into the single-quoted form evaluators expect:
/// `"x"` and bare words become `'x'`; numbers and keywords are left alone.
/// Quotes and backslashes inside a string are escaped with `\`.
pub fn normalize_strings(condition: &str) -> String {
    LITERALS.replace_all(condition, |caps: &Captures| {
        let token = &caps[0];
        if let Some(inner) = caps.get(1) {
            return format!("'{}'", escape(inner.as_str()))
        }
        let first = token.chars().next().unwrap_or(' ');
        if first == '\'' || first.is_ascii_digit() || first == '.' || KEYWORDS.contains(&token) {
            token.to_string()
        } else {
            format!("'{}'", token)
        }
    }).into_owned()
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64, Option<String>),
    Str(String),
    Word(String),
    Symbol(&'static str),
}

const SYMBOLS: [&'static str; 17] = [
    "==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "+", "-", "*", "/", "%", "(", ")", "=",
];

fn tokenize(text: &str) -> result::Result<Vec<Token>, String> {
    let mut tokens = vec![];
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let c = rest.chars().next().unwrap_or(' ');
        let consumed = if c == '\'' || c == '"' {
            let (value, len) = read_string(rest, c)
                .ok_or_else(|| format!("unterminated string in `{}`", text))?;
            tokens.push(Token::Str(value));
            len
        } else if c.is_ascii_digit() || (c == '.' && rest[1..].starts_with(|d: char| d.is_ascii_digit())) {
            let digits = rest.find(|d: char| !(d.is_ascii_digit() || d == '.')).unwrap_or(rest.len());
            let unit_len = rest[digits..]
                .find(|u: char| !(u.is_ascii_alphabetic() || u == '%'))
                .unwrap_or(rest.len() - digits);
            let scalar = rest[..digits].parse::<f64>()
                .map_err(|_| format!("invalid number `{}`", &rest[..digits]))?;
            let unit = &rest[digits..digits + unit_len];
            tokens.push(Token::Number(scalar, if unit.is_empty() { None } else { Some(unit.to_string()) }));
            digits + unit_len
        } else if c.is_alphabetic() || c == '_' {
            let len = rest.find(|w: char| !(w.is_alphanumeric() || w == '_' || w == '-')).unwrap_or(rest.len());
            tokens.push(Token::Word(rest[..len].to_string()));
            len
        } else {
            match SYMBOLS.iter().find(|s| rest.starts_with(*s)) {
                Some(&s) => {
                    tokens.push(Token::Symbol(s));
                    s.len()
                },
                None => return Err(format!("unexpected `{}` in `{}`", c, text)),
            }
        };
        rest = rest[consumed..].trim_start();
    }
    Ok(tokens)
}

/// Reads a quoted string at the start of `rest`, undoing `\` escapes.
/// Returns the contents and the number of bytes consumed.
fn read_string(rest: &str, quote: char) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            let (_, escaped) = chars.next()?;
            value.push(escaped);
        } else if c == quote {
            return Some((value, i + c.len_utf8()))
        } else {
            value.push(c);
        }
    }
    None
}

/// Recursive descent over `or`, `and`, `not`, comparisons and arithmetic.
pub struct DefaultConditionEvaluator;

impl ConditionEvaluator for DefaultConditionEvaluator {
    fn evaluate(&self, expression: &str) -> result::Result<Literal, String> {
        let tokens = tokenize(expression)?;
        if tokens.is_empty() {
            return Err(String::from("empty condition"))
        }
        let mut parser = Parser { tokens: tokens, pos: 0 };
        let value = parser.or_expr()?;
        match parser.peek() {
            None => Ok(value),
            Some(t) => Err(format!("unexpected {:?} in `{}`", t, expression)),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, alternatives: &[&str]) -> Option<&'static str> {
        let found = match self.peek() {
            Some(&Token::Symbol(s)) if alternatives.contains(&s) => Some(s),
            Some(&Token::Word(ref w)) => KEYWORDS.iter()
                .find(|k| **k == w.as_str() && alternatives.contains(*k))
                .cloned(),
            _ => None,
        };
        if found.is_some() {
            self.pos += 1;
        }
        found
    }

    fn or_expr(&mut self) -> result::Result<Literal, String> {
        let mut left = self.and_expr()?;
        while self.eat(&["or", "||"]).is_some() {
            let right = self.and_expr()?;
            left = Literal::Bool(left.is_truthy() || right.is_truthy());
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> result::Result<Literal, String> {
        let mut left = self.not_expr()?;
        while self.eat(&["and", "&&"]).is_some() {
            let right = self.not_expr()?;
            left = Literal::Bool(left.is_truthy() && right.is_truthy());
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> result::Result<Literal, String> {
        if self.eat(&["not", "!"]).is_some() {
            let value = self.not_expr()?;
            return Ok(Literal::Bool(!value.is_truthy()))
        }
        self.comparison()
    }

    fn comparison(&mut self) -> result::Result<Literal, String> {
        let left = self.additive()?;
        let op = match self.eat(&["==", "=", "!=", "<", "<=", ">", ">="]) {
            Some(op) => op,
            None => return Ok(left),
        };
        let right = self.additive()?;
        match op {
            "==" | "=" => Ok(Literal::Bool(equals(&left, &right))),
            "!=" => Ok(Literal::Bool(!equals(&left, &right))),
            _ => {
                let (a, b) = comparable_numbers(&left, &right)?;
                Ok(Literal::Bool(match op {
                    "<" => a < b,
                    "<=" => a <= b,
                    ">" => a > b,
                    _ => a >= b,
                }))
            },
        }
    }

    fn additive(&mut self) -> result::Result<Literal, String> {
        let mut left = self.multiplicative()?;
        while let Some(op) = self.eat(&["+", "-"]) {
            let right = self.multiplicative()?;
            left = arithmetic(op, left, right)?;
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> result::Result<Literal, String> {
        let mut left = self.unary()?;
        while let Some(op) = self.eat(&["*", "/", "%"]) {
            let right = self.unary()?;
            left = arithmetic(op, left, right)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> result::Result<Literal, String> {
        if self.eat(&["-"]).is_some() {
            return match self.unary()? {
                Literal::Number(n, unit) => Ok(Literal::Number(-n, unit)),
                other => Err(format!("cannot negate {}", other)),
            }
        }
        self.primary()
    }

    fn primary(&mut self) -> result::Result<Literal, String> {
        let token = match self.tokens.get(self.pos).cloned() {
            Some(t) => t,
            None => return Err(String::from("unexpected end of condition")),
        };
        self.pos += 1;
        match token {
            Token::Number(n, unit) => Ok(Literal::Number(n, unit)),
            Token::Str(s) => Ok(Literal::Str(s)),
            Token::Word(ref w) if w == "true" => Ok(Literal::Bool(true)),
            Token::Word(ref w) if w == "false" => Ok(Literal::Bool(false)),
            Token::Word(ref w) if w == "null" => Ok(Literal::Null),
            Token::Word(w) => Ok(Literal::Str(w)),
            Token::Symbol("(") => {
                let value = self.or_expr()?;
                match self.eat(&[")"]) {
                    Some(_) => Ok(value),
                    None => Err(String::from("expected `)`")),
                }
            },
            Token::Symbol(s) => Err(format!("unexpected `{}`", s)),
        }
    }
}

fn equals(left: &Literal, right: &Literal) -> bool {
    match (left, right) {
        (&Literal::Number(a, ref ua), &Literal::Number(b, ref ub)) => {
            a == b && (ua == ub || ua.is_none() || ub.is_none())
        },
        (a, b) => a == b,
    }
}

fn comparable_numbers(left: &Literal, right: &Literal) -> result::Result<(f64, f64), String> {
    match (left, right) {
        (&Literal::Number(a, ref ua), &Literal::Number(b, ref ub))
            if ua == ub || ua.is_none() || ub.is_none() => Ok((a, b)),
        _ => Err(format!("cannot compare {} with {}", left, right)),
    }
}

fn arithmetic(op: &str, left: Literal, right: Literal) -> result::Result<Literal, String> {
    match (left, right) {
        (Literal::Number(a, ua), Literal::Number(b, ub)) => {
            let unit = ua.or(ub);
            let value = match op {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" => a / b,
                _ => a % b,
            };
            Ok(Literal::Number(value, unit))
        },
        (Literal::Str(a), Literal::Str(b)) if op == "+" => Ok(Literal::Str(a + &b)),
        (left, right) => Err(format!("undefined operation {} {} {}", left, op, right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> result::Result<Literal, String> {
        DefaultConditionEvaluator.evaluate(&normalize_strings(s))
    }

    #[test]
    fn it_quotes_words_and_double_quoted_strings() {
        assert_eq!("'a' == 'b'", normalize_strings("\"a\" == b"));
        assert_eq!("10px > 5 and true", normalize_strings("10px > 5 and true"));
        assert_eq!("'#fff' != 'red'", normalize_strings("#fff != red"));
        assert_eq!("'it''s'", normalize_strings("'it''s'"));
    }

    #[test]
    fn it_escapes_quotes_inside_strings() {
        assert_eq!(r"'it\'s' == 'it\'s'", normalize_strings("\"it's\" == \"it's\""));
        assert_eq!(r"'a\\b'", normalize_strings(r#""a\b""#));
        assert_eq!(Ok(Literal::Bool(true)), eval("\"it's\" == \"it's\""));
        assert_eq!(Ok(Literal::Str(String::from("it's"))), eval("\"it's\""));
        assert_eq!(r"'it\'s'", Literal::Str(String::from("it's")).to_string());
    }

    #[test]
    fn it_compares_numbers() {
        assert_eq!(Ok(Literal::Bool(true)), eval("3 < 5"));
        assert_eq!(Ok(Literal::Bool(false)), eval("10px <= 5px"));
        assert_eq!(Ok(Literal::Bool(true)), eval("1 + 2 * 3 == 7"));
        assert!(eval("1px < 2em").is_err());
    }

    #[test]
    fn it_compares_strings() {
        assert_eq!(Ok(Literal::Bool(true)), eval("\"dark\" == dark"));
        assert_eq!(Ok(Literal::Bool(true)), eval("light != dark"));
    }

    #[test]
    fn it_combines_with_and_or_not() {
        assert_eq!(Ok(Literal::Bool(true)), eval("not (1 > 2) and (true or false)"));
        assert_eq!(Ok(Literal::Bool(false)), eval("!true || null"));
    }

    #[test]
    fn it_returns_non_boolean_values_as_they_are() {
        assert_eq!(Ok(Literal::Number(3.0, None)), eval("1 + 2"));
        assert_eq!(Ok(Literal::Str(String::from("dark"))), eval("dark"));
    }

    #[test]
    fn it_fails_on_garbage() {
        assert!(eval("1 <").is_err());
        assert!(eval("(1 == 1").is_err());
        assert!(eval("").is_err());
    }
}
