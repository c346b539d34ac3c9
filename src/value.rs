// used when binding filter values and reading result cells
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};

// used to print out readable forms of a value
use std::fmt;
// values end up in hashed sets when categories are derived
use std::hash::{Hash, Hasher};
use std::cmp::Ordering;

use serde::{Serialize, Serializer};

use crate::error::{OppsqlError, Result};

/// The native type a stored text value is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Text,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Text => "string",
        }
    }
}

/// A single attribute, parameter or filter value.
///
/// The result database stores attribute and parameter values as text, so a
/// value read from it is usually produced by [`Scalar::infer`], which tries the
/// variants in the order bool, int, float and falls back to text.
#[derive(Debug, Clone)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Ordered type inference. `true`/`false` must never fall through to text
    /// and integer looking values must never become floats.
    pub fn infer(text: &str) -> Scalar {
        match text {
            "true" => return Scalar::Bool(true),
            "false" => return Scalar::Bool(false),
            _ => (),
        }
        if let Ok(i) = text.parse::<i64>() {
            return Scalar::Int(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Scalar::Float(f);
        }
        Scalar::Text(text.to_string())
    }

    /// Strict conversion of stored text into the given kind.
    pub fn parse_as(kind: Kind, text: &str) -> Result<Scalar> {
        let failed = || OppsqlError::Coercion {
            value: text.to_string(),
            target: kind.name(),
        };
        match kind {
            Kind::Bool => match text {
                "true" | "1" => Ok(Scalar::Bool(true)),
                "false" | "0" => Ok(Scalar::Bool(false)),
                _ => Err(failed()),
            },
            Kind::Int => text.trim().parse().map(Scalar::Int).map_err(|_| failed()),
            Kind::Float => text.trim().parse().map(Scalar::Float).map_err(|_| failed()),
            Kind::Text => Ok(Scalar::Text(text.to_string())),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Scalar::Bool(_) => Kind::Bool,
            Scalar::Int(_) => Kind::Int,
            Scalar::Float(_) => Kind::Float,
            Scalar::Text(_) => Kind::Text,
        }
    }

    /// Convert into another kind, going through the text encoding when the
    /// kinds differ.
    pub fn coerce(self, kind: Kind) -> Result<Scalar> {
        match (self, kind) {
            (s, k) if s.kind() == k => Ok(s),
            (Scalar::Int(i), Kind::Float) => Ok(Scalar::Float(i as f64)),
            (s, k) => Scalar::parse_as(k, &s.encode()),
        }
    }

    /// The text encoding used by the result database.
    pub fn encode(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Read a result cell. NULL has no scalar counterpart.
    pub fn from_value_ref(value: ValueRef<'_>) -> Option<Scalar> {
        match value {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(Scalar::Int(i)),
            ValueRef::Real(f) => Some(Scalar::Float(f)),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Some(Scalar::Text(String::from_utf8_lossy(t).into_owned()))
            }
        }
    }

    /// Natural order: numbers by magnitude, text lexicographically, and
    /// otherwise bool < number < text.
    pub fn natural_cmp(&self, other: &Scalar) -> Ordering {
        fn rank(s: &Scalar) -> u8 {
            match s {
                Scalar::Bool(_) => 0,
                Scalar::Int(_) | Scalar::Float(_) => 1,
                Scalar::Text(_) => 2,
            }
        }
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            (a, b) if rank(a) == 1 && rank(b) == 1 => {
                a.as_f64().total_cmp(&b.as_f64())
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Scalar::Int(i) => *i as f64,
            Scalar::Float(f) => *f,
            Scalar::Bool(b) => f64::from(u8::from(*b)),
            Scalar::Text(_) => f64::NAN,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits(),
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Bool(b) => b.hash(state),
            Scalar::Int(i) => i.hash(state),
            Scalar::Float(f) => f.to_bits().hash(state),
            Scalar::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

// Booleans are bound as their lowercase text form, everything else natively so
// that the text affinity of the attribute columns does the comparison.
impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Scalar::Bool(b) => ToSqlOutput::from(if *b { "true" } else { "false" }),
            Scalar::Int(i) => ToSqlOutput::from(*i),
            Scalar::Float(f) => ToSqlOutput::from(*f),
            Scalar::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}
impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => Value::Text(b.to_string()),
            Scalar::Int(i) => Value::Integer(i),
            Scalar::Float(f) => Value::Real(f),
            Scalar::Text(s) => Value::Text(s),
        }
    }
}
impl FromSql for Scalar {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(t) => Ok(Scalar::infer(&String::from_utf8_lossy(t))),
            other => Scalar::from_value_ref(other).ok_or(rusqlite::types::FromSqlError::InvalidType),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self { Scalar::Bool(b) }
}
impl From<i64> for Scalar {
    fn from(i: i64) -> Self { Scalar::Int(i) }
}
impl From<i32> for Scalar {
    fn from(i: i32) -> Self { Scalar::Int(i64::from(i)) }
}
impl From<f64> for Scalar {
    fn from(f: f64) -> Self { Scalar::Float(f) }
}
impl From<&str> for Scalar {
    fn from(s: &str) -> Self { Scalar::Text(s.to_string()) }
}
impl From<String> for Scalar {
    fn from(s: String) -> Self { Scalar::Text(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_precedence() {
        assert_eq!(Scalar::infer("true"), Scalar::Bool(true));
        assert_eq!(Scalar::infer("false"), Scalar::Bool(false));
        assert_eq!(Scalar::infer("320"), Scalar::Int(320));
        assert_eq!(Scalar::infer("-4"), Scalar::Int(-4));
        assert_eq!(Scalar::infer("13.9"), Scalar::Float(13.9));
        assert_eq!(Scalar::infer("1e3"), Scalar::Float(1000.0));
        assert_eq!(Scalar::infer("True"), Scalar::Text("True".into()));
        assert_eq!(Scalar::infer("Net.car[0]"), Scalar::Text("Net.car[0]".into()));
    }

    #[test]
    fn coercion_between_kinds() {
        assert_eq!(Scalar::Text("42".into()).coerce(Kind::Int).unwrap(), Scalar::Int(42));
        assert_eq!(Scalar::Int(3).coerce(Kind::Float).unwrap(), Scalar::Float(3.0));
        assert_eq!(Scalar::Text("true".into()).coerce(Kind::Bool).unwrap(), Scalar::Bool(true));
        let err = Scalar::Text("fast".into()).coerce(Kind::Float).unwrap_err();
        assert!(format!("{err}").contains("float"));
    }

    #[test]
    fn natural_order_mixes_numbers() {
        let mut values = vec![Scalar::Float(13.9), Scalar::Int(2), Scalar::Text("a".into()), Scalar::Int(100)];
        values.sort_by(Scalar::natural_cmp);
        assert_eq!(values, vec![Scalar::Int(2), Scalar::Float(13.9), Scalar::Int(100), Scalar::Text("a".into())]);
    }
}
