//! Recursive-descent parser producing a closed AST.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?          right-associative
//! primary := NUMBER | NAME | NAME '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! Names and call arities are resolved here, so a parsed tree can always
//! be evaluated.

use super::functions::{floor_mod, lookup, Callee, Func1, Func2, LookupError};
use super::lexer::{Spanned, Token};
use super::ExprError;

/// Deepest allowed nesting of parentheses / unary operators.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Num(f64),
    /// The time variable `t`.
    Time,
    Neg(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Call1(Func1, Box<Node>),
    Call2(Func2, Box<Node>, Box<Node>),
}

impl Node {
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            Node::Num(v) => *v,
            Node::Time => t,
            Node::Neg(inner) => -inner.eval(t),
            Node::Binary(op, a, b) => {
                let (a, b) = (a.eval(t), b.eval(t));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Rem => floor_mod(a, b),
                    BinOp::Pow => a.powf(b),
                }
            }
            Node::Call1(f, x) => f.apply(x.eval(t)),
            Node::Call2(f, a, b) => f.apply(a.eval(t), b.eval(t)),
        }
    }

    /// True if the tree references `t` anywhere.
    pub fn depends_on_time(&self) -> bool {
        match self {
            Node::Num(_) => false,
            Node::Time => true,
            Node::Neg(inner) | Node::Call1(_, inner) => inner.depends_on_time(),
            Node::Binary(_, a, b) | Node::Call2(_, a, b) => a.depends_on_time() || b.depends_on_time(),
        }
    }
}

pub struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    src_len: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned], src_len: usize) -> Self {
        Self { tokens, pos: 0, depth: 0, src_len }
    }

    /// Parse the whole token stream as one expression.
    pub fn parse(mut self) -> Result<Node, ExprError> {
        if self.tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let node = self.expr()?;
        match self.peek() {
            None => Ok(node),
            Some(tok) => Err(ExprError::UnexpectedToken {
                found: tok.token.describe(),
                pos: tok.pos,
            }),
        }
    }

    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Spanned> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, want: &Token) -> bool {
        match self.peek() {
            Some(tok) if tok.token == *want => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, want: Token) -> Result<(), ExprError> {
        match self.next() {
            Some(tok) if tok.token == want => Ok(()),
            Some(tok) => Err(ExprError::UnexpectedToken {
                found: tok.token.describe(),
                pos: tok.pos,
            }),
            None => Err(ExprError::UnexpectedEnd { pos: self.src_len }),
        }
    }

    fn enter(&mut self, pos: usize) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep { pos });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&Token::Plus) {
                BinOp::Add
            } else if self.eat(&Token::Minus) {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&Token::Star) {
                BinOp::Mul
            } else if self.eat(&Token::Slash) {
                BinOp::Div
            } else if self.eat(&Token::Percent) {
                BinOp::Rem
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Node, ExprError> {
        let pos = self.peek().map_or(self.src_len, |t| t.pos);
        if self.eat(&Token::Minus) {
            self.enter(pos)?;
            let inner = self.unary()?;
            self.leave();
            return Ok(Node::Neg(Box::new(inner)));
        }
        if self.eat(&Token::Plus) {
            self.enter(pos)?;
            let inner = self.unary()?;
            self.leave();
            return Ok(inner);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node, ExprError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let pos = self.peek().map_or(self.src_len, |t| t.pos);
            self.enter(pos)?;
            // unary, not power: allows `2^-t` and makes `2^3^2` == 2^(3^2)
            let exponent = self.unary()?;
            self.leave();
            return Ok(Node::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node, ExprError> {
        let Some(tok) = self.next() else {
            return Err(ExprError::UnexpectedEnd { pos: self.src_len });
        };

        match &tok.token {
            Token::Number(v) => Ok(Node::Num(*v)),
            Token::LParen => {
                self.enter(tok.pos)?;
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                self.leave();
                Ok(inner)
            }
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    self.call(name, tok.pos)
                } else {
                    resolve_name(name, tok.pos)
                }
            }
            other => Err(ExprError::UnexpectedToken {
                found: other.describe(),
                pos: tok.pos,
            }),
        }
    }

    /// Parse the argument list after `name(`.
    fn call(&mut self, name: &str, pos: usize) -> Result<Node, ExprError> {
        self.enter(pos)?;
        let mut args = vec![self.expr()?];
        while self.eat(&Token::Comma) {
            args.push(self.expr()?);
        }
        self.expect(Token::RParen)?;
        self.leave();

        let argc = args.len();
        let callee = lookup(name, argc).map_err(|e| match e {
            LookupError::Unknown => ExprError::UnknownFunction { name: name.to_string(), pos },
            LookupError::Arity(expected) => ExprError::WrongArity {
                name: name.to_string(),
                expected,
                found: argc,
                pos,
            },
        })?;

        let mut args = args.into_iter();
        // argc was checked by `lookup`, so these are present
        let mut arg = || Box::new(args.next().unwrap_or(Node::Num(f64::NAN)));
        Ok(match callee {
            Callee::Unary(f) => Node::Call1(f, arg()),
            Callee::Binary(f) => {
                let a = arg();
                let b = arg();
                Node::Call2(f, a, b)
            }
        })
    }
}

fn resolve_name(name: &str, pos: usize) -> Result<Node, ExprError> {
    match name {
        "t" => Ok(Node::Time),
        "pi" => Ok(Node::Num(std::f64::consts::PI)),
        "tau" => Ok(Node::Num(std::f64::consts::TAU)),
        "e" => Ok(Node::Num(std::f64::consts::E)),
        _ => Err(ExprError::UnknownName { name: name.to_string(), pos }),
    }
}
