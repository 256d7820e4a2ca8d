use std::fmt;

/// The value carried by a `Literal` node.
#[derive(Debug, Clone)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Digits of a BigInt literal as written, without the `n` suffix.
    BigInt(String),
    RegExp { pattern: String, flags: String },
}

impl LiteralValue {
    /// SameValue comparison: `NaN` equals `NaN`, `0` differs from `-0`.
    ///
    /// Regular expressions compare by pattern and flags, so `/a/` and `/a/g`
    /// are different values.
    pub fn same_value(&self, other: &LiteralValue) -> bool {
        match (self, other) {
            (LiteralValue::Null, LiteralValue::Null) => true,
            (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => a == b,
            (LiteralValue::Number(a), LiteralValue::Number(b)) => same_number(*a, *b),
            (LiteralValue::String(a), LiteralValue::String(b)) => a == b,
            (LiteralValue::BigInt(a), LiteralValue::BigInt(b)) => a == b,
            (
                LiteralValue::RegExp { pattern: p1, flags: f1 },
                LiteralValue::RegExp { pattern: p2, flags: f2 },
            ) => p1 == p2 && f1 == f2,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn same_number(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    a.to_bits() == b.to_bits()
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::String(s) => write!(f, "{:?}", s),
            LiteralValue::BigInt(digits) => write!(f, "{}n", digits),
            LiteralValue::RegExp { pattern, flags } => write!(f, "/{}/{}", pattern, flags),
        }
    }
}
