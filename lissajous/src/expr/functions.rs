//! The fixed allow-list of callable functions.
//!
//! Nothing outside this table is reachable from a formula.

use crate::waveform::{sawtooth_wave, square_wave, triangle_wave};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func1 {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Round,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func2 {
    Atan2,
    Min,
    Max,
    Pow,
    Mod,
    Hypot,
    /// `square(x, duty)`
    SquareDuty,
    /// `sawtooth(x, width)`
    SawtoothWidth,
}

/// A resolved function reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    Unary(Func1),
    Binary(Func2),
}

const UNARY: &[(&str, Func1)] = &[
    ("sin", Func1::Sin),
    ("cos", Func1::Cos),
    ("tan", Func1::Tan),
    ("asin", Func1::Asin),
    ("acos", Func1::Acos),
    ("atan", Func1::Atan),
    ("sinh", Func1::Sinh),
    ("cosh", Func1::Cosh),
    ("tanh", Func1::Tanh),
    ("exp", Func1::Exp),
    ("ln", Func1::Ln),
    ("log", Func1::Ln),
    ("log10", Func1::Log10),
    ("log2", Func1::Log2),
    ("sqrt", Func1::Sqrt),
    ("abs", Func1::Abs),
    ("sign", Func1::Sign),
    ("floor", Func1::Floor),
    ("ceil", Func1::Ceil),
    ("round", Func1::Round),
    ("square", Func1::Square),
    ("sawtooth", Func1::Sawtooth),
    ("triangle", Func1::Triangle),
];

const BINARY: &[(&str, Func2)] = &[
    ("atan2", Func2::Atan2),
    ("min", Func2::Min),
    ("max", Func2::Max),
    ("pow", Func2::Pow),
    ("mod", Func2::Mod),
    ("hypot", Func2::Hypot),
    ("square", Func2::SquareDuty),
    ("sawtooth", Func2::SawtoothWidth),
];

/// What went wrong when resolving a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    Unknown,
    /// The name exists but not with this many arguments.
    Arity(&'static str),
}

/// Resolve `name` called with `argc` arguments.
pub fn lookup(name: &str, argc: usize) -> Result<Callee, LookupError> {
    let unary = UNARY.iter().find(|(n, _)| *n == name).map(|(_, f)| *f);
    let binary = BINARY.iter().find(|(n, _)| *n == name).map(|(_, f)| *f);

    match (argc, unary, binary) {
        (1, Some(f), _) => Ok(Callee::Unary(f)),
        (2, _, Some(f)) => Ok(Callee::Binary(f)),
        (_, None, None) => Err(LookupError::Unknown),
        (_, Some(_), Some(_)) => Err(LookupError::Arity("1 or 2")),
        (_, Some(_), None) => Err(LookupError::Arity("1")),
        (_, None, Some(_)) => Err(LookupError::Arity("2")),
    }
}

/// Every callable name, for help text.
pub fn names() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = UNARY
        .iter()
        .map(|(n, _)| *n)
        .chain(BINARY.iter().map(|(n, _)| *n))
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

impl Func1 {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func1::Sin => x.sin(),
            Func1::Cos => x.cos(),
            Func1::Tan => x.tan(),
            Func1::Asin => x.asin(),
            Func1::Acos => x.acos(),
            Func1::Atan => x.atan(),
            Func1::Sinh => x.sinh(),
            Func1::Cosh => x.cosh(),
            Func1::Tanh => x.tanh(),
            Func1::Exp => x.exp(),
            Func1::Ln => x.ln(),
            Func1::Log10 => x.log10(),
            Func1::Log2 => x.log2(),
            Func1::Sqrt => x.sqrt(),
            Func1::Abs => x.abs(),
            // numpy semantics: sign(0) == 0
            Func1::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    x
                }
            }
            Func1::Floor => x.floor(),
            Func1::Ceil => x.ceil(),
            Func1::Round => x.round(),
            Func1::Square => square_wave(x, 0.5),
            Func1::Sawtooth => sawtooth_wave(x, 1.0),
            Func1::Triangle => triangle_wave(x),
        }
    }
}

/// Floor modulo: the result takes the divisor's sign, `-7 mod 3 = 2`.
pub fn floor_mod(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

impl Func2 {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Func2::Atan2 => a.atan2(b),
            Func2::Min => a.min(b),
            Func2::Max => a.max(b),
            Func2::Pow => a.powf(b),
            Func2::Mod => floor_mod(a, b),
            Func2::Hypot => a.hypot(b),
            Func2::SquareDuty => square_wave(a, b),
            Func2::SawtoothWidth => sawtooth_wave(a, b),
        }
    }
}
