use std::fmt;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LeftParen,
    RightParen,
    Comma,
}

impl Op {
    pub fn from_char(c: char) -> Option<Op> {
        let r = match c {
            '+' => Op::Plus,
            '-' => Op::Minus,
            '*' => Op::Star,
            '/' => Op::Slash,
            '%' => Op::Percent,
            '(' => Op::LeftParen,
            ')' => Op::RightParen,
            ',' => Op::Comma,
            _   => return None,
        };
        Some(r)
    }

    pub fn same_or_greater_precedence(self, other: Op) -> bool {
        match (self, other) {
            (Op::Plus, Op::Star) |
            (Op::Minus, Op::Star) |
            (Op::Plus, Op::Slash) |
            (Op::Minus, Op::Slash) |
            (Op::Plus, Op::Percent) |
            (Op::Minus, Op::Percent) |
            (Op::LeftParen, _) => false,
            (_, _) => true,
        }
    }

    pub fn math(self, first: f64, second: f64) -> f64 {
        match self {
            Op::Plus    => first + second,
            Op::Minus   => first - second,
            Op::Star    => first * second,
            Op::Slash   => first / second,
            Op::Percent => first % second,
            _ => first,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Op::Plus => write!(f, "+"),
            Op::Minus => write!(f, "-"),
            Op::Star => write!(f, "*"),
            Op::Slash => write!(f, "/"),
            Op::Percent => write!(f, "%"),
            Op::LeftParen => write!(f, "("),
            Op::RightParen => write!(f, ")"),
            Op::Comma => write!(f, ","),
        }
    }
}
