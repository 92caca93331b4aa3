// src/engine/expression.rs
//! Band algebra expressions such as `(B8-B4)/(B8+B4)`.
//!
//! Expressions are parsed once, bound to band slots, then evaluated per
//! pixel. Band identifiers are bare names (`B8`, `LST_Day_1km`).

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("unexpected character `{ch}` at {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected `{found}` at {pos}")]
    UnexpectedToken { pos: usize, found: String },

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{name}` takes {expected} arguments, got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("band `{0}` is not available")]
    UnboundBand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Pow,
    Abs,
    Min,
    Max,
    Clamp,
    Exp,
    Log,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Self::Sqrt,
            "pow" => Self::Pow,
            "abs" => Self::Abs,
            "min" => Self::Min,
            "max" => Self::Max,
            "clamp" => Self::Clamp,
            "exp" => Self::Exp,
            "log" => Self::Log,
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            Self::Sqrt | Self::Abs | Self::Exp | Self::Log => 1,
            Self::Pow | Self::Min | Self::Max => 2,
            Self::Clamp => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Clamp => "clamp",
            Self::Exp => "exp",
            Self::Log => "log",
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Self::Sqrt => args[0].sqrt(),
            Self::Pow => args[0].powf(args[1]),
            Self::Abs => args[0].abs(),
            Self::Min => args[0].min(args[1]),
            Self::Max => args[0].max(args[1]),
            Self::Clamp => args[0].max(args[1]).min(args[2]),
            Self::Exp => args[0].exp(),
            Self::Log => args[0].ln(),
        }
    }
}

/// Expression tree. `B` is the band reference: a name after parsing, a
/// slot index after [`Expr::bind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<B = String> {
    Number(f64),
    Band(B),
    Neg(Box<Expr<B>>),
    Binary(BinaryOp, Box<Expr<B>>, Box<Expr<B>>),
    Call(Function, Vec<Expr<B>>),
}

impl Expr<String> {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expression()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(expr),
            Some((pos, token)) => Err(ExpressionError::UnexpectedToken {
                pos: *pos,
                found: token.to_string(),
            }),
        }
    }

    /// Every band name referenced by the expression.
    pub fn bands(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_bands(&mut out);
        out
    }

    fn collect_bands(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Band(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) => inner.collect_bands(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_bands(out);
                rhs.collect_bands(out);
            }
            Expr::Call(_, args) => args.iter().for_each(|arg| arg.collect_bands(out)),
        }
    }

    /// Replace band names with their slot in `slots`.
    pub fn bind(&self, slots: &HashMap<String, usize>) -> Result<Expr<usize>, ExpressionError> {
        Ok(match self {
            Expr::Number(value) => Expr::Number(*value),
            Expr::Band(name) => Expr::Band(
                *slots
                    .get(name)
                    .ok_or_else(|| ExpressionError::UnboundBand(name.clone()))?,
            ),
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.bind(slots)?)),
            Expr::Binary(op, lhs, rhs) => {
                Expr::Binary(*op, Box::new(lhs.bind(slots)?), Box::new(rhs.bind(slots)?))
            }
            Expr::Call(func, args) => Expr::Call(
                *func,
                args.iter().map(|arg| arg.bind(slots)).collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl Expr<usize> {
    /// Evaluate against one pixel's band values.
    pub fn eval(&self, pixel: &[f64]) -> f64 {
        match self {
            Expr::Number(value) => *value,
            Expr::Band(slot) => pixel[*slot],
            Expr::Neg(inner) => -inner.eval(pixel),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(pixel), rhs.eval(pixel));
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Pow => a.powf(b),
                }
            }
            Expr::Call(func, args) => {
                let values: Vec<f64> = args.iter().map(|arg| arg.eval(pixel)).collect();
                func.apply(&values)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::StarStar => write!(f, "**"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        let start = i;
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
                continue;
            }
            '+' => tokens.push((start, Token::Plus)),
            '-' => tokens.push((start, Token::Minus)),
            '/' => tokens.push((start, Token::Slash)),
            '(' => tokens.push((start, Token::LParen)),
            ')' => tokens.push((start, Token::RParen)),
            ',' => tokens.push((start, Token::Comma)),
            '*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    i += 1;
                    tokens.push((start, Token::StarStar));
                } else {
                    tokens.push((start, Token::Star));
                }
            }
            '0'..='9' | '.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // exponent: 1e-6, 2E3
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text = &source[start..i];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::UnexpectedToken {
                        pos: start,
                        found: text.to_string(),
                    })?;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push((start, Token::Ident(source[start..i].to_string())));
                continue;
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or(c);
                return Err(ExpressionError::UnexpectedChar { pos: start, ch });
            }
        }
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, token)| token)
    }

    fn next(&mut self) -> Result<(usize, Token), ExpressionError> {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(item)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionError> {
        let (pos, token) = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(ExpressionError::UnexpectedToken {
                pos,
                found: token.to_string(),
            })
        }
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // unary := '-' unary | power
    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    // power := primary ('**' unary)?   (right associative)
    fn power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::StarStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExpressionError> {
        let (pos, token) = self.next()?;
        match token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if self.peek() != Some(&Token::LParen) {
                    return Ok(Expr::Band(name));
                }
                self.pos += 1;
                let func =
                    Function::lookup(&name).ok_or_else(|| ExpressionError::UnknownFunction(name))?;
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    loop {
                        args.push(self.expression()?);
                        if self.peek() == Some(&Token::Comma) {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
                self.expect(Token::RParen)?;
                if args.len() != func.arity() {
                    return Err(ExpressionError::Arity {
                        name: func.name().to_string(),
                        expected: func.arity(),
                        found: args.len(),
                    });
                }
                Ok(Expr::Call(func, args))
            }
            other => Err(ExpressionError::UnexpectedToken {
                pos,
                found: other.to_string(),
            }),
        }
    }
}
