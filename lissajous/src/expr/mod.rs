//! Sandboxed formula language for arbitrary waveforms.
//!
//! A formula is a function of the single variable `t` built from numbers,
//! `+ - * / % ^` (`**` is accepted for `^`), parentheses, the constants
//! `pi`, `e` and `tau`, and a fixed allow-list of functions (see
//! [`names`]). There is no assignment, no attribute access and no way to
//! name anything outside that list, so evaluating user text can only ever
//! compute a number.
//!
//! ```
//! use lissajous::expr::Expr;
//!
//! let expr = Expr::parse("2 * sin(2*pi*3*t) + sawtooth(t, 0.5)").unwrap();
//! let y = expr.eval(0.0);
//! assert!((y - -1.0).abs() < 1e-12);
//! ```

mod functions;
mod lexer;
mod parser;

use std::str::FromStr;

pub use functions::names;
pub use parser::MAX_DEPTH;

use parser::{Node, Parser};

/// Longest accepted formula, in bytes.
pub const MAX_LEN: usize = 1024;

/// Error type for formula parsing.
///
/// Positions are byte offsets into the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    Empty,
    TooLong { len: usize },
    UnexpectedChar { ch: char, pos: usize },
    BadNumber { text: String, pos: usize },
    UnexpectedToken { found: String, pos: usize },
    UnexpectedEnd { pos: usize },
    UnknownName { name: String, pos: usize },
    UnknownFunction { name: String, pos: usize },
    WrongArity { name: String, expected: &'static str, found: usize, pos: usize },
    TooDeep { pos: usize },
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::Empty => write!(f, "expression is empty"),
            ExprError::TooLong { len } => {
                write!(f, "expression is {} bytes long (limit {})", len, MAX_LEN)
            }
            ExprError::UnexpectedChar { ch, pos } => {
                write!(f, "unexpected character '{}' at {}", ch, pos)
            }
            ExprError::BadNumber { text, pos } => write!(f, "malformed number '{}' at {}", text, pos),
            ExprError::UnexpectedToken { found, pos } => write!(f, "unexpected {} at {}", found, pos),
            ExprError::UnexpectedEnd { pos } => write!(f, "expression ends unexpectedly at {}", pos),
            ExprError::UnknownName { name, pos } => {
                write!(f, "unknown name '{}' at {} (only 't', 'pi', 'e' and 'tau' are defined)", name, pos)
            }
            ExprError::UnknownFunction { name, pos } => write!(f, "unknown function '{}' at {}", name, pos),
            ExprError::WrongArity { name, expected, found, pos } => write!(
                f,
                "'{}' at {} takes {} argument(s), got {}",
                name, pos, expected, found
            ),
            ExprError::TooDeep { pos } => {
                write!(f, "expression nested deeper than {} levels at {}", MAX_DEPTH, pos)
            }
        }
    }
}

impl std::error::Error for ExprError {}

impl ExprError {
    /// Byte offset the error points at, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            ExprError::Empty | ExprError::TooLong { .. } => None,
            ExprError::UnexpectedChar { pos, .. }
            | ExprError::BadNumber { pos, .. }
            | ExprError::UnexpectedToken { pos, .. }
            | ExprError::UnexpectedEnd { pos }
            | ExprError::UnknownName { pos, .. }
            | ExprError::UnknownFunction { pos, .. }
            | ExprError::WrongArity { pos, .. }
            | ExprError::TooDeep { pos } => Some(*pos),
        }
    }
}

/// A parsed formula in `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    source: String,
    root: Node,
}

impl Expr {
    /// Parse and validate a formula.
    ///
    /// Every name and call is checked here, so [`Expr::eval`] can't fail.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        if source.len() > MAX_LEN {
            return Err(ExprError::TooLong { len: source.len() });
        }
        let tokens = lexer::tokenize(source)?;
        let root = Parser::new(&tokens, source.len()).parse()?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Evaluate at time `t`. May return NaN or ±inf (e.g. `1/t` at 0).
    pub fn eval(&self, t: f64) -> f64 {
        self.root.eval(t)
    }

    /// Evaluate at every time in `ts`.
    pub fn eval_all(&self, ts: &[f64]) -> Vec<f64> {
        ts.iter().map(|&t| self.root.eval(t)).collect()
    }

    /// False for constant formulas like `2*pi`.
    pub fn depends_on_time(&self) -> bool {
        self.root.depends_on_time()
    }
}

impl FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn eval(src: &str, t: f64) -> f64 {
        Expr::parse(src).unwrap().eval(t)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("8 / 4 / 2", 0.0), 1.0);
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_negation() {
        assert_eq!(eval("2^3^2", 0.0), 512.0);
        assert_eq!(eval("-2^2", 0.0), -4.0);
        assert_eq!(eval("2**-1", 0.0), 0.5);
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(eval("7 % 3", 0.0), 1.0);
        assert_eq!(eval("-7 % 3", 0.0), 2.0);
        assert_eq!(eval("-7 % -3", 0.0), -1.0);
        assert_eq!(eval("7 % -3", 0.0), -2.0);
    }

    #[test]
    fn mod_function_agrees_with_operator() {
        for (a, b) in [(7.0, 3.0), (-7.0, 3.0), (-7.0, -3.0), (7.0, -3.0), (5.5, 2.0)] {
            let call = eval(&format!("mod({}, {})", a, b), 0.0);
            let op = eval(&format!("({}) % ({})", a, b), 0.0);
            assert_eq!(call, op, "mod({}, {})", a, b);
        }
        assert_eq!(eval("mod(-7, -3)", 0.0), -1.0);
    }

    #[test]
    fn time_variable_and_constants() {
        assert!(close(eval("sin(2*pi*3*t)", 0.25 / 3.0), 1.0));
        assert!(close(eval("cos(t)", PI), -1.0));
        assert!(close(eval("tau / 2", 0.0), PI));
        assert!(close(eval("ln(e)", 0.0), 1.0));
    }

    #[test]
    fn periodic_helpers_match_waveforms() {
        assert_eq!(eval("square(t)", 0.1), 1.0);
        assert_eq!(eval("square(t)", PI + 0.1), -1.0);
        assert!(close(eval("sawtooth(t)", 0.0), -1.0));
        assert!(close(eval("sawtooth(t, 0.5)", PI), 1.0));
        assert!(close(eval("triangle(t)", PI), 1.0));
    }

    #[test]
    fn two_argument_functions() {
        assert_eq!(eval("max(t, 2)", 1.0), 2.0);
        assert_eq!(eval("min(t, 2)", 1.0), 1.0);
        assert_eq!(eval("pow(2, 10)", 0.0), 1024.0);
        assert_eq!(eval("hypot(3, 4)", 0.0), 5.0);
    }

    #[test]
    fn division_by_zero_is_not_an_error() {
        assert!(eval("1/t", 0.0).is_infinite());
        assert!(eval("sqrt(t)", -1.0).is_nan());
    }

    #[test]
    fn dangling_operator() {
        assert_eq!(Expr::parse("t +"), Err(ExprError::UnexpectedEnd { pos: 3 }));
    }

    #[test]
    fn undefined_name() {
        assert_eq!(
            Expr::parse("x * 2"),
            Err(ExprError::UnknownName { name: "x".into(), pos: 0 })
        );
    }

    #[test]
    fn unknown_function_cannot_reach_outside() {
        for src in ["open(t)", "eval(t)", "system(1)", "exec(t)"] {
            assert!(
                matches!(Expr::parse(src), Err(ExprError::UnknownFunction { .. })),
                "{} should be rejected",
                src
            );
        }
        assert!(matches!(
            Expr::parse("__import__('os')"),
            Err(ExprError::UnexpectedChar { ch: '\'', .. })
        ));
    }

    #[test]
    fn wrong_arity() {
        assert_eq!(
            Expr::parse("sin(t, 2)"),
            Err(ExprError::WrongArity {
                name: "sin".into(),
                expected: "1",
                found: 2,
                pos: 0
            })
        );
    }

    #[test]
    fn unbalanced_parens() {
        assert!(matches!(Expr::parse("(t + 1"), Err(ExprError::UnexpectedEnd { .. })));
        assert!(matches!(Expr::parse("t + 1)"), Err(ExprError::UnexpectedToken { pos: 5, .. })));
    }

    #[test]
    fn empty_and_blank() {
        assert_eq!(Expr::parse(""), Err(ExprError::Empty));
        assert_eq!(Expr::parse("   "), Err(ExprError::Empty));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}t{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(Expr::parse(&deep), Err(ExprError::TooDeep { .. })));

        let ok = format!("{}t{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(Expr::parse(&ok).is_ok());

        let negations = "-".repeat(MAX_DEPTH + 1) + "t";
        assert!(matches!(Expr::parse(&negations), Err(ExprError::TooDeep { .. })));
    }

    #[test]
    fn length_is_bounded() {
        let long = "t+".repeat(MAX_LEN) + "t";
        assert!(matches!(Expr::parse(&long), Err(ExprError::TooLong { .. })));
    }

    #[test]
    fn constant_expressions_are_detected() {
        assert!(!Expr::parse("2*pi").unwrap().depends_on_time());
        assert!(Expr::parse("cos(t)^2").unwrap().depends_on_time());
    }

    #[test]
    fn error_messages_carry_position() {
        let err = Expr::parse("sin(t) + foo").unwrap_err();
        assert_eq!(err.position(), Some(9));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn from_str_and_display_round_trip_source() {
        let e: Expr = "sin(t)".parse().unwrap();
        assert_eq!(e.to_string(), "sin(t)");
    }
}
