use std::fmt;

/// Payload of a scalar node.
///
/// Integers are kept apart from floats so they round-trip exactly. Equality
/// compares integers by value, so `Int(5)` and `UInt(5)` are equal.
#[derive(Clone, Debug)]
pub enum Scalar {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Str(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::UInt(u) => i64::try_from(*u).ok(),
            Scalar::Float(f) => exact_integer(*f).and_then(|f| {
                (f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
            }),
            Scalar::Str(s) => s.parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Scalar::UInt(u) => Some(*u),
            Scalar::Int(i) => u64::try_from(*i).ok(),
            Scalar::Float(f) => exact_integer(*f)
                .and_then(|f| (f >= 0.0 && f < u64::MAX as f64).then_some(f as u64)),
            Scalar::Str(s) => s.parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            Scalar::UInt(u) => Some(*u as f64),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Str(s) => s.parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// Short description used in type mismatch errors, e.g. `string "abc"`.
    pub fn describe(&self) -> String {
        match self {
            Scalar::Bool(b) => format!("boolean {b}"),
            Scalar::UInt(u) => format!("integer {u}"),
            Scalar::Int(i) => format!("integer {i}"),
            Scalar::Float(f) => format!("number {}", format_float(*f)),
            Scalar::Str(s) => format!("string \"{s}\""),
        }
    }
}

fn exact_integer(f: f64) -> Option<f64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f)
}

/// Canonical float text. Always carries a fraction or an exponent, so the
/// decoder reads it back as a float rather than an integer.
pub(crate) fn format_float(f: f64) -> String {
    format!("{f:?}")
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Int(i), Scalar::UInt(u)) | (Scalar::UInt(u), Scalar::Int(i)) => {
                u64::try_from(*i).is_ok_and(|i| i == *u)
            }
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}

/// Text form of the payload: strings verbatim, everything else canonical.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::UInt(u) => write!(f, "{u}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => f.write_str(&format_float(*x)),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_owned())
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<f32> for Scalar {
    fn from(f: f32) -> Self {
        Scalar::Float(f64::from(f))
    }
}

impl From<u64> for Scalar {
    fn from(u: u64) -> Self {
        Scalar::UInt(u)
    }
}

// Non-negative signed values are stored unsigned, matching what the decoder
// produces for the same text.
impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        match u64::try_from(i) {
            Ok(u) => Scalar::UInt(u),
            Err(_) => Scalar::Int(i),
        }
    }
}

macro_rules! scalar_from_int {
    ($wide:ty => $($t:ty),*) => {$(
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Scalar::from(v as $wide)
            }
        }
    )*};
}

scalar_from_int!(u64 => u8, u16, u32, usize);
scalar_from_int!(i64 => i8, i16, i32, isize);
