use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Boxed parameter or query result.
///
/// Numbers coerce freely between variants: floats truncate to ints, strings count as 0.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(Arc<str>),
}

impl Value {
    pub fn as_int(&self) -> i32 {
        match self {
            Self::Int(i) => *i,
            Self::Float(f) => *f as i32,
            Self::Str(_) => 0,
        }
    }

    pub fn as_float(&self) -> f32 {
        match self {
            Self::Int(i) => *i as f32,
            Self::Float(f) => *f,
            Self::Str(_) => 0.0,
        }
    }

    /// Lossless for both numeric variants.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(i) => f64::from(*i),
            Self::Float(f) => f64::from(*f),
            Self::Str(_) => 0.0,
        }
    }

    /// Floats render with six decimals, ints in plain decimal.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Float(f) => Cow::Owned(format!("{f:.6}")),
            Self::Str(s) => Cow::Borrowed(s),
        }
    }

    pub fn is_truthy(&self) -> bool {
        self.as_f64() != 0.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Int(i32::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Arc::from(v))
    }
}
