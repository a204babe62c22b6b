use crate::value::fmt_float;
use lexers::{LispToken, LispTokenizer, Scanner};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected ')' at token {0}")]
    UnexpectedCParen(usize),
    #[error("unbalanced parentheses: {0} unclosed '(' at end of input")]
    UnclosedParen(usize),
    #[error("nothing to quote after '")]
    DanglingQuote,
    #[error("unterminated string literal {0}")]
    UnterminatedString(String),
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Deepest list nesting the reader accepts. Trees are dropped, rendered
/// and quoted recursively, so this bounds the stack they need.
pub const MAX_NESTING: usize = 512;

/// Syntax tree as read from source.
#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Vec<Expr>),
}

impl Expr {
    /// integer first, then float, else a symbol
    pub fn atom(token: &str) -> Expr {
        if let Ok(n) = i64::from_str(token) {
            Expr::Int(n)
        } else if let Ok(n) = f64::from_str(token) {
            Expr::Float(n)
        } else {
            Expr::Symbol(token.to_string())
        }
    }

    pub fn symbol(name: &str) -> Expr { Expr::Symbol(name.to_string()) }

    fn quoted(self) -> Expr {
        Expr::List(vec![Expr::symbol("quote"), self])
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Float(n) => write!(f, "{}", fmt_float(*n)),
            Expr::Str(s) => write!(f, "{:?}", s),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, " ")?; }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

enum Open {
    List(Vec<Expr>),
    Quote,
}

pub struct Parser;

impl Parser {
    /// Every top-level expression in `source`, in order.
    pub fn parse_str(source: &str) -> Result<Vec<Expr>, ParseError> {
        let mut lex = LispTokenizer::scanner(source);
        let mut exprs = Vec::new();
        while let Some(expr) = Parser::parse(&mut lex)? {
            exprs.push(expr);
        }
        Ok(exprs)
    }

    /// Read one expression off the token stream, `None` once it's exhausted.
    ///
    /// Open lists are kept on an explicit stack, input nested past
    /// `MAX_NESTING` is rejected before it is built.
    pub fn parse<I>(lex: &mut Scanner<I>) -> Result<Option<Expr>, ParseError>
            where I: Iterator<Item=LispToken> {
        let mut open: Vec<Open> = Vec::new();
        loop {
            if open.len() > MAX_NESTING {
                return Err(ParseError::TooDeep(MAX_NESTING));
            }
            let mut expr = match lex.next() {
                None if open.is_empty() => return Ok(None),
                None => return Err(match open.last() {
                    Some(Open::Quote) => ParseError::DanglingQuote,
                    _ => ParseError::UnclosedParen(
                        open.iter().filter(|o| matches!(o, Open::List(_))).count()),
                }),
                Some(LispToken::OParen) => { open.push(Open::List(Vec::new())); continue; },
                Some(LispToken::Quote) => { open.push(Open::Quote); continue; },
                Some(LispToken::CParen) => match open.pop() {
                    Some(Open::List(items)) => Expr::List(items),
                    _ => return Err(ParseError::UnexpectedCParen(lex.pos())),
                },
                Some(LispToken::Text(s)) => Expr::Str(s),
                Some(LispToken::Atom(a)) if a.starts_with('"') => {
                    return Err(ParseError::UnterminatedString(a));
                },
                Some(LispToken::Atom(a)) => Expr::atom(&a),
            };
            // fold the finished expression into whatever is waiting for it
            loop {
                match open.pop() {
                    None => return Ok(Some(expr)),
                    Some(Open::Quote) => expr = expr.quoted(),
                    Some(Open::List(mut items)) => {
                        items.push(expr);
                        open.push(Open::List(items));
                        break;
                    }
                }
            }
        }
    }
}
