//! Dice notation lexer, parser and evaluator.
//!
//! Accepts arithmetic over integers and dice terms: `3d6+2`, `d100`,
//! `(1d4+1)*5`, `1d`. A missing count means one die, a missing face count
//! means the caller's default.

use std::fmt::Write as _;
use std::ops::Range;

use logos::Logos;

use super::{MAX_DIE_COUNT, MAX_FACES, Roll};
use crate::error::DiceError;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t]+")]
enum RawToken {
    #[regex("[0-9]+")]
    Number,

    #[token("d")]
    #[token("D")]
    Dice,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(i64),
    Dice,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Truncating integer division.
    Div,
}

impl BinOp {
    fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    fn apply(self, lhs: i64, rhs: i64) -> Result<i64, DiceError> {
        match self {
            Self::Add => lhs.checked_add(rhs).ok_or(DiceError::Overflow),
            Self::Sub => lhs.checked_sub(rhs).ok_or(DiceError::Overflow),
            Self::Mul => lhs.checked_mul(rhs).ok_or(DiceError::Overflow),
            Self::Div => {
                if rhs == 0 {
                    return Err(DiceError::DivisionByZero);
                }
                lhs.checked_div(rhs).ok_or(DiceError::Overflow)
            }
        }
    }
}

/// A parsed dice expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer literal.
    Number(i64),
    /// A dice term. `None` parts fall back to one die and the default faces.
    Dice {
        /// How many dice to roll.
        count: Option<Box<Expr>>,
        /// How many faces each die has.
        faces: Option<Box<Expr>>,
    },
    /// Unary negation.
    Neg(Box<Expr>),
    /// A parenthesised sub-expression.
    Group(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

/// Parse a dice expression.
pub fn parse(expression: &str) -> Result<Expr, DiceError> {
    let tokens = lex(expression)?;
    if tokens.is_empty() {
        return Err(DiceError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source: expression,
    };
    let expr = parser.expr()?;
    if let Some((_, span)) = tokens.get(parser.pos) {
        return Err(parser.unexpected(span.clone()));
    }
    Ok(expr)
}

fn lex(source: &str) -> Result<Vec<(Token, Range<usize>)>, DiceError> {
    let mut tokens = Vec::new();
    for (raw, span) in RawToken::lexer(source).spanned() {
        let Ok(raw) = raw else {
            return Err(DiceError::Unexpected {
                found: snippet(source, &span),
                position: span.start,
                expression: source.to_string(),
            });
        };
        let token = match raw {
            RawToken::Number => {
                let text = &source[span.clone()];
                let value = text
                    .parse::<i64>()
                    .map_err(|_| DiceError::NumberTooLarge(text.to_string()))?;
                Token::Number(value)
            }
            RawToken::Dice => Token::Dice,
            RawToken::Plus => Token::Plus,
            RawToken::Minus => Token::Minus,
            RawToken::Star => Token::Star,
            RawToken::Slash => Token::Slash,
            RawToken::LParen => Token::LParen,
            RawToken::RParen => Token::RParen,
        };
        tokens.push((token, span));
    }
    Ok(tokens)
}

fn snippet(source: &str, span: &Range<usize>) -> String {
    match source.get(span.clone()) {
        Some(text) => text.to_string(),
        None => String::from_utf8_lossy(&source.as_bytes()[span.clone()]).into_owned(),
    }
}

struct Parser<'a> {
    tokens: &'a [(Token, Range<usize>)],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, span: Range<usize>) -> DiceError {
        DiceError::Unexpected {
            found: snippet(self.source, &span),
            position: span.start,
            expression: self.source.to_string(),
        }
    }

    fn fail_here(&self) -> DiceError {
        match self.tokens.get(self.pos) {
            Some((_, span)) => self.unexpected(span.clone()),
            None => DiceError::UnexpectedEnd(self.source.to_string()),
        }
    }

    fn expr(&mut self) -> Result<Expr, DiceError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, DiceError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, DiceError> {
        if self.peek() == Some(Token::Minus) {
            self.bump();
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.dice()
    }

    fn dice(&mut self) -> Result<Expr, DiceError> {
        let count = match self.peek() {
            Some(Token::Dice) => None,
            _ => Some(self.primary()?),
        };
        if self.peek() != Some(Token::Dice) {
            // `count` is always present here: a missing count implies a `d`.
            return count.ok_or_else(|| self.fail_here());
        }
        self.bump();
        let faces = match self.peek() {
            Some(Token::Number(_)) | Some(Token::LParen) => Some(Box::new(self.primary()?)),
            _ => None,
        };
        Ok(Expr::Dice {
            count: count.map(Box::new),
            faces,
        })
    }

    fn primary(&mut self) -> Result<Expr, DiceError> {
        match self.peek() {
            Some(Token::Number(n)) => {
                self.bump();
                Ok(Expr::Number(n))
            }
            Some(Token::LParen) => {
                self.bump();
                let inner = self.expr()?;
                if self.peek() != Some(Token::RParen) {
                    return Err(self.fail_here());
                }
                self.bump();
                Ok(Expr::Group(Box::new(inner)))
            }
            _ => Err(self.fail_here()),
        }
    }
}

/// Draws one face from a die with the given number of faces.
pub type Draw<'a> = dyn FnMut(u32) -> Result<u32, DiceError> + 'a;

struct Evaluation<'a, 'b> {
    default_faces: u32,
    draw: &'a mut Draw<'b>,
    rolled_any: bool,
}

impl Expr {
    /// Evaluate the expression, drawing each die face from `draw`.
    pub fn evaluate(&self, default_faces: u32, draw: &mut Draw<'_>) -> Result<Roll, DiceError> {
        let mut eval = Evaluation {
            default_faces,
            draw,
            rolled_any: false,
        };
        let mut substituted = String::new();
        let total = eval.node(self, true, &mut substituted)?;
        let rendered = self.render(default_faces);
        let total_text = total.to_string();
        let detail = if rendered == total_text {
            rendered
        } else if !eval.rolled_any || substituted == total_text || substituted == rendered {
            format!("{rendered}={total_text}")
        } else {
            format!("{rendered}={substituted}={total_text}")
        };
        Ok(Roll { total, detail })
    }

    /// The value obtained when every die shows its highest face.
    pub fn max_value(&self, default_faces: u32) -> Result<i64, DiceError> {
        let mut highest = |faces: u32| -> Result<u32, DiceError> { Ok(faces) };
        self.evaluate(default_faces, &mut highest).map(|roll| roll.total)
    }

    /// Render the expression in normalized notation (`3D6+2`).
    pub fn render(&self, default_faces: u32) -> String {
        let mut out = String::new();
        self.render_into(default_faces, &mut out);
        out
    }

    fn render_into(&self, default_faces: u32, out: &mut String) {
        match self {
            Self::Number(n) => {
                let _ = write!(out, "{n}");
            }
            Self::Dice { count, faces } => {
                match count {
                    Some(count) => count.render_into(default_faces, out),
                    None => out.push('1'),
                }
                out.push('D');
                match faces {
                    Some(faces) => faces.render_into(default_faces, out),
                    None => {
                        let _ = write!(out, "{default_faces}");
                    }
                }
            }
            Self::Neg(inner) => {
                out.push('-');
                inner.render_into(default_faces, out);
            }
            Self::Group(inner) => {
                out.push('(');
                inner.render_into(default_faces, out);
                out.push(')');
            }
            Self::Binary { op, lhs, rhs } => {
                lhs.render_into(default_faces, out);
                out.push(op.symbol());
                rhs.render_into(default_faces, out);
            }
        }
    }
}

impl Evaluation<'_, '_> {
    fn node(&mut self, expr: &Expr, top: bool, out: &mut String) -> Result<i64, DiceError> {
        match expr {
            Expr::Number(n) => {
                let _ = write!(out, "{n}");
                Ok(*n)
            }
            Expr::Neg(inner) => {
                out.push('-');
                let value = self.node(inner, false, out)?;
                value.checked_neg().ok_or(DiceError::Overflow)
            }
            Expr::Group(inner) => {
                out.push('(');
                let value = self.node(inner, false, out)?;
                out.push(')');
                Ok(value)
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.node(lhs, false, out)?;
                out.push(op.symbol());
                let rhs = self.node(rhs, false, out)?;
                op.apply(lhs, rhs)
            }
            Expr::Dice { count, faces } => {
                let mut scratch = String::new();
                let count = match count {
                    Some(count) => self.node(count, false, &mut scratch)?,
                    None => 1,
                };
                let faces = match faces {
                    Some(faces) => self.node(faces, false, &mut scratch)?,
                    None => i64::from(self.default_faces),
                };
                if !(1..=i64::from(MAX_DIE_COUNT)).contains(&count) {
                    return Err(DiceError::DieCount(count));
                }
                if !(1..=i64::from(MAX_FACES)).contains(&faces) {
                    return Err(DiceError::DieFaces(faces));
                }
                self.rolled_any = true;
                let faces = faces as u32;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push((self.draw)(faces)?);
                }
                let total: i64 = values.iter().map(|v| i64::from(*v)).sum();
                let joined = values
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join("+");
                if values.len() > 1 && !top {
                    let _ = write!(out, "({joined})");
                } else {
                    out.push_str(&joined);
                }
                Ok(total)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(faces: &[u32]) -> impl FnMut(u32) -> Result<u32, DiceError> + '_ {
        let mut iter = faces.iter();
        move |_| iter.next().copied().ok_or(DiceError::Exhausted)
    }

    #[test]
    fn parses_plain_arithmetic() {
        let expr = parse("3+2*4").unwrap();
        let mut draw = scripted(&[]);
        let roll = expr.evaluate(100, &mut draw).unwrap();
        assert_eq!(roll.total, 11);
        assert_eq!(roll.detail, "3+2*4=11");
    }

    #[test]
    fn single_number_detail() {
        let mut draw = scripted(&[]);
        let roll = parse("42").unwrap().evaluate(100, &mut draw).unwrap();
        assert_eq!(roll.total, 42);
        assert_eq!(roll.detail, "42");
    }

    #[test]
    fn dice_with_modifier() {
        let mut draw = scripted(&[4]);
        let roll = parse("1d6+2").unwrap().evaluate(100, &mut draw).unwrap();
        assert_eq!(roll.total, 6);
        assert_eq!(roll.detail, "1D6+2=4+2=6");
    }

    #[test]
    fn multiple_dice_top_level() {
        let mut draw = scripted(&[2, 5, 6]);
        let roll = parse("3D6").unwrap().evaluate(100, &mut draw).unwrap();
        assert_eq!(roll.total, 13);
        assert_eq!(roll.detail, "3D6=2+5+6=13");
    }

    #[test]
    fn nested_dice_are_grouped() {
        let mut draw = scripted(&[1, 2, 3]);
        let roll = parse("2d6+1d4").unwrap().evaluate(100, &mut draw).unwrap();
        assert_eq!(roll.total, 6);
        assert_eq!(roll.detail, "2D6+1D4=(1+2)+3=6");
    }

    #[test]
    fn defaults_fill_missing_parts() {
        assert_eq!(parse("d").unwrap().render(20), "1D20");
        assert_eq!(parse("2d").unwrap().render(10), "2D10");
        assert_eq!(parse("d8").unwrap().render(100), "1D8");
    }

    #[test]
    fn max_value_uses_highest_faces() {
        assert_eq!(parse("1d6").unwrap().max_value(100).unwrap(), 6);
        assert_eq!(parse("2d10+3").unwrap().max_value(100).unwrap(), 23);
        assert_eq!(parse("d").unwrap().max_value(100).unwrap(), 100);
    }

    #[test]
    fn negation_and_groups() {
        let mut draw = scripted(&[]);
        let roll = parse("-(3+2)*2").unwrap().evaluate(100, &mut draw).unwrap();
        assert_eq!(roll.total, -10);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse("1d6x"), Err(DiceError::Unexpected { .. })));
        assert!(matches!(parse("力量"), Err(DiceError::Unexpected { .. })));
        assert!(matches!(parse("1+"), Err(DiceError::UnexpectedEnd(_))));
        assert!(matches!(parse("(1+2"), Err(DiceError::UnexpectedEnd(_))));
        assert!(matches!(parse("1 2"), Err(DiceError::Unexpected { .. })));
        assert_eq!(parse("   "), Err(DiceError::Empty));
    }

    #[test]
    fn rejects_out_of_range_dice() {
        let mut draw = scripted(&[]);
        assert_eq!(
            parse("0d6").unwrap().evaluate(100, &mut draw),
            Err(DiceError::DieCount(0))
        );
        assert_eq!(
            parse("1d0").unwrap().evaluate(100, &mut draw),
            Err(DiceError::DieFaces(0))
        );
    }

    #[test]
    fn division_by_zero() {
        let mut draw = scripted(&[]);
        assert_eq!(
            parse("4/0").unwrap().evaluate(100, &mut draw),
            Err(DiceError::DivisionByZero)
        );
    }

    #[test]
    fn huge_literal() {
        assert!(matches!(
            parse("99999999999999999999"),
            Err(DiceError::NumberTooLarge(_))
        ));
    }
}
