use ast::expression::{Expression, FunctionCall, Unit};
use ast::number_value::NumberValue;
use error::{Result, SassError, ErrorKind};
use operator::Op;
use sass::color_value::ColorValue;

use std::str::FromStr;

/// Splits a value string such as `$width * 2 + 1px` into expression units.
#[derive(Debug)]
pub struct ValueTokenizer<'a> {
    value_str: &'a str,
    bytes: &'a [u8],
    offset: usize,
    last_was_an_operator: bool,
}

fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\n' || c == b'\t' || c == b'\r'
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c >= 0x80
}

fn ends_word(c: u8) -> bool {
    is_whitespace(c) || match c {
        b'+' | b'*' | b'/' | b'%' | b'(' | b')' | b',' | b'"' | b'\'' | b'$' => true,
        _ => false,
    }
}

impl<'a> ValueTokenizer<'a> {
    pub fn new(value_str: &'a str) -> ValueTokenizer<'a> {
        ValueTokenizer {
            value_str: value_str,
            bytes: value_str.as_bytes(),
            offset: 0,
            last_was_an_operator: true,
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.offset + ahead).cloned()
    }

    fn starts_number(&self, ahead: usize) -> bool {
        match (self.peek(ahead), self.peek(ahead + 1)) {
            (Some(c), _) if c.is_ascii_digit() => true,
            (Some(b'.'), Some(d)) if d.is_ascii_digit() => true,
            _ => false,
        }
    }

    fn scan_while<F: Fn(u8) -> bool>(&mut self, pred: F) -> &'a str {
        let start = self.offset;
        while self.offset < self.bytes.len() && pred(self.bytes[self.offset]) {
            self.offset += 1;
        }
        &self.value_str[start..self.offset]
    }

    /// Offset just past the `)` matching the `(` at `open`.
    fn matching_paren(&self, open: usize) -> Result<usize> {
        let mut depth = 0;
        let mut quote: Option<u8> = None;
        for (i, &c) in self.bytes[open..].iter().enumerate() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {},
                None => match c {
                    b'"' | b'\'' => quote = Some(c),
                    b'(' => depth += 1,
                    b')' => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(open + i + 1)
                        }
                    },
                    _ => {},
                },
            }
        }
        Err(SassError::new(
            ErrorKind::InvalidValue,
            format!("Expected `)` to close the parenthesis in `{}`", self.value_str),
        ))
    }

    fn next_string(&mut self) -> Result<Unit> {
        let quote = self.bytes[self.offset];
        let start = self.offset + 1;
        match self.bytes[start..].iter().position(|&c| c == quote) {
            Some(len) => {
                self.offset = start + len + 1;
                Ok(Unit::Str(self.value_str[start..start + len].to_string()))
            },
            None => Err(SassError::new(
                ErrorKind::InvalidValue,
                format!("Unterminated string in `{}`", self.value_str),
            )),
        }
    }

    fn next_variable(&mut self) -> Result<Unit> {
        self.offset += 1;
        let name = self.scan_while(is_name_char);
        if name.is_empty() {
            return Err(SassError::new(
                ErrorKind::InvalidValue,
                format!("Expected a variable name after `$` in `{}`", self.value_str),
            ))
        }
        Ok(Unit::Variable(name.to_string()))
    }

    fn next_number(&mut self) -> Unit {
        let start = self.offset;
        if self.bytes[self.offset] == b'-' {
            self.offset += 1;
        }
        self.scan_while(|c| c.is_ascii_digit() || c == b'.');
        let scalar = self.value_str[start..self.offset].parse::<f64>().unwrap_or(0.0);
        let unit = self.scan_while(|c| c.is_ascii_alphabetic() || c == b'%');
        if unit.is_empty() {
            Unit::Number(NumberValue::from_scalar(scalar))
        } else {
            Unit::Number(NumberValue::with_units(scalar, unit))
        }
    }

    fn next_hash(&mut self) -> Unit {
        let start = self.offset;
        self.offset += 1;
        self.scan_while(is_name_char);
        let word = &self.value_str[start..self.offset];
        match ColorValue::from_hex(word) {
            Some(color) => Unit::Color(color),
            None => Unit::Ident(word.to_string()),
        }
    }

    fn next_word(&mut self) -> Result<Unit> {
        let start = self.offset;
        self.offset += 1;
        self.scan_while(|c| !ends_word(c));
        let name = &self.value_str[start..self.offset];

        if self.peek(0) != Some(b'(') {
            return Ok(Unit::Ident(name.to_string()))
        }

        let open = self.offset;
        let close = self.matching_paren(open)?;
        self.offset = close;
        let inner = &self.value_str[open + 1..close - 1];

        if name.eq_ignore_ascii_case("url") {
            return Ok(Unit::Ident(format!("{}({})", name, inner)))
        }

        Ok(Unit::Function(FunctionCall {
            name: name.to_string(),
            parameters: inner.parse()?,
        }))
    }

    fn parse(&mut self) -> Result<Unit> {
        let c = self.bytes[self.offset];
        let preceded_by_space = self.offset > 0 && is_whitespace(self.bytes[self.offset - 1]);

        let unit = match c {
            b'"' | b'\'' => self.next_string()?,
            b'$' => self.next_variable()?,
            b'#' => self.next_hash(),
            b'-' if self.starts_number(1) &&
                    (self.last_was_an_operator || preceded_by_space) => self.next_number(),
            b'-' if self.peek(1).map_or(false, |d| d.is_ascii_alphabetic() || d == b'-' || d == b'_') => {
                self.next_word()?
            },
            _ if self.starts_number(0) => self.next_number(),
            _ => match Op::from_char(c as char) {
                Some(op) => {
                    self.offset += 1;
                    Unit::Operator(op)
                },
                None => self.next_word()?,
            },
        };

        self.last_was_an_operator = match unit {
            Unit::Operator(Op::RightParen) => false,
            Unit::Operator(_) => true,
            _ => false,
        };
        Ok(unit)
    }
}

impl<'a> Iterator for ValueTokenizer<'a> {
    type Item = Result<Unit>;

    fn next(&mut self) -> Option<Result<Unit>> {
        self.scan_while(is_whitespace);
        if self.offset < self.value_str.len() {
            return Some(self.parse())
        }
        None
    }
}

impl FromStr for Expression {
    type Err = SassError;

    fn from_str(s: &str) -> Result<Expression> {
        let units = ValueTokenizer::new(s).collect::<Result<Vec<_>>>()?;
        Ok(Expression::new(units))
    }
}
