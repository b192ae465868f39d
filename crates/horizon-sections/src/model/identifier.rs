//! Stable item identifiers.
//!
//! An [`Identifier`] is the key used to recognize "the same logical item"
//! across two versions of a data model. It is deliberately independent of the
//! item's own equality: two versions of a record with different content share
//! an identifier, and reconciliation reports them as a modification rather
//! than a delete followed by an insert.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A hashable, ordered key identifying an item across model versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// A boolean key.
    Bool(bool),
    /// A signed integer key.
    Int(i64),
    /// An unsigned integer key that does not fit in `i64`.
    UInt(u64),
    /// A string key.
    Text(String),
    /// A key made of several parts, e.g. a table name and a row id.
    Composite(Vec<Identifier>),
}

impl Identifier {
    /// Builds a composite identifier from its parts.
    pub fn composite<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Identifier>,
    {
        Self::Composite(parts.into_iter().map(Into::into).collect())
    }

    /// Returns the string value, if this is a text identifier.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this identifier holds one that fits `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Converts a scalar JSON value into an identifier.
    ///
    /// Objects, arrays, null and non-integral numbers have no identifier form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::UInt)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Composite(parts) => {
                f.write_str("[")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Identifier {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Identifier {
            fn from(value: $ty) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self::Int(v),
            Err(_) => Self::UInt(value),
        }
    }
}

impl From<usize> for Identifier {
    fn from(value: usize) -> Self {
        Self::from(value as u64)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Identifier {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl<A: Into<Identifier>, B: Into<Identifier>> From<(A, B)> for Identifier {
    fn from((a, b): (A, B)) -> Self {
        Self::Composite(vec![a.into(), b.into()])
    }
}
