use std::any::Any;

use super::{BindField, ListField, ParseFailure, ScalarField, Slot};
use crate::errors::{BoxError, ScanError};
use crate::value::Value;

/// A scalar type with built-in conversion rules.
///
/// Implemented for `bool`, every integer and float width, and `String`.
pub trait Primitive: Any + Sized + Send {
    /// The name of the type, used in error messages.
    const EXPECTED: &'static str;

    /// Parse a form value.
    ///
    /// Empty input is the zero value of the type: `0`, `0.0`, `false` or `""`.
    fn parse_text(raw: &str) -> Result<Self, BoxError>;

    /// Take a dynamic value of the same type, widening numbers when no precision is lost.
    ///
    /// Floats are truncated into `i32` and `i64`.
    fn from_value(value: &Value) -> Option<Self>;

    /// Convert a value handed over by a database driver.
    fn from_driver(value: Value) -> Result<Self, ScanError>;

    /// The value to hand back to a database driver.
    fn to_driver(&self) -> Value;
}

/// Parse a boolean leniently: `1`, `t`, `T`, `TRUE`, `true`, `True` and their negated counterparts.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
#[error("`{0}` is not a valid boolean")]
struct InvalidBool(String);

fn driver_text(expected: &'static str, value: Value) -> Result<String, ScanError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Bytes(b) => String::from_utf8(b).map_err(|e| ScanError::Parse {
            expected,
            raw: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            reason: e.to_string(),
        }),
        other => Err(ScanError::Incompatible {
            expected,
            found: other.kind(),
        }),
    }
}

fn parse_error(expected: &'static str, raw: String, reason: impl ToString) -> ScanError {
    ScanError::Parse {
        expected,
        raw,
        reason: reason.to_string(),
    }
}

macro_rules! integers {
    ($($t:ty => $truncates_floats:literal),* $(,)?) => {
        $(
            impl Primitive for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn parse_text(raw: &str) -> Result<Self, BoxError> {
                    let raw = if raw.is_empty() { "0" } else { raw };
                    Ok(raw.parse::<$t>()?)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$t>::try_from(*i).ok(),
                        Value::Float(f) if $truncates_floats => {
                            let f = f.trunc();
                            (f.is_finite() && f >= <$t>::MIN as f64 && f <= <$t>::MAX as f64)
                                .then(|| f as $t)
                        }
                        _ => None,
                    }
                }

                fn from_driver(value: Value) -> Result<Self, ScanError> {
                    let out_of_range = |raw: String| ScanError::OutOfRange { expected: Self::EXPECTED, raw };
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| out_of_range(i.to_string())),
                        Value::Float(f) => {
                            if f.fract() != 0.0 || !f.is_finite() {
                                return Err(parse_error(Self::EXPECTED, f.to_string(), "not a whole number"));
                            }
                            if f < <$t>::MIN as f64 || f > <$t>::MAX as f64 {
                                return Err(out_of_range(f.to_string()));
                            }
                            Ok(f as $t)
                        }
                        other => {
                            let raw = driver_text(Self::EXPECTED, other)?;
                            raw.parse::<$t>().map_err(|e| parse_error(Self::EXPECTED, raw, e))
                        }
                    }
                }

                fn to_driver(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(i) => Value::Int(i),
                        Err(_) => Value::Float(*self as f64),
                    }
                }
            }

            impl BindField for $t {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Scalar(self)
                }
            }
        )*
    };
}

integers! {
    i8 => false,
    i16 => false,
    i32 => true,
    i64 => true,
    isize => false,
    u8 => false,
    u16 => false,
    u32 => false,
    u64 => false,
    usize => false,
}

macro_rules! floats {
    ($($t:ty),* $(,)?) => {
        $(
            impl Primitive for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn parse_text(raw: &str) -> Result<Self, BoxError> {
                    let raw = if raw.is_empty() { "0.0" } else { raw };
                    Ok(raw.parse::<$t>()?)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Float(f) => Some(*f as $t),
                        Value::Int(i) => Some(*i as $t),
                        _ => None,
                    }
                }

                fn from_driver(value: Value) -> Result<Self, ScanError> {
                    match value {
                        Value::Float(f) => Ok(f as $t),
                        Value::Int(i) => Ok(i as $t),
                        other => {
                            let raw = driver_text(Self::EXPECTED, other)?;
                            raw.parse::<$t>().map_err(|e| parse_error(Self::EXPECTED, raw, e))
                        }
                    }
                }

                fn to_driver(&self) -> Value {
                    Value::Float(f64::from(*self))
                }
            }

            impl BindField for $t {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Scalar(self)
                }
            }
        )*
    };
}

floats!(f32, f64);

impl Primitive for bool {
    const EXPECTED: &'static str = "bool";

    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        if raw.is_empty() {
            return Ok(false);
        }
        parse_bool(raw).ok_or_else(|| InvalidBool(raw.to_owned()).into())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn from_driver(value: Value) -> Result<Self, ScanError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(1) => Ok(true),
            Value::Int(0) => Ok(false),
            Value::Int(i) => Err(ScanError::OutOfRange {
                expected: Self::EXPECTED,
                raw: i.to_string(),
            }),
            other => {
                let raw = driver_text(Self::EXPECTED, other)?;
                parse_bool(&raw).ok_or_else(|| {
                    parse_error(Self::EXPECTED, raw.clone(), InvalidBool(raw))
                })
            }
        }
    }

    fn to_driver(&self) -> Value {
        Value::Bool(*self)
    }
}

impl BindField for bool {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Scalar(self)
    }
}

impl Primitive for String {
    const EXPECTED: &'static str = "String";

    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(raw.to_owned())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn from_driver(value: Value) -> Result<Self, ScanError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => Ok(String::from_utf8_lossy(&b).into_owned()),
            other => match other.as_text() {
                Some(text) => Ok(text.into_owned()),
                None => Err(ScanError::Incompatible {
                    expected: Self::EXPECTED,
                    found: other.kind(),
                }),
            },
        }
    }

    fn to_driver(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl BindField for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Scalar(self)
    }
}

impl<P: Primitive> ScalarField for P {
    fn expected(&self) -> &'static str {
        P::EXPECTED
    }

    fn set_text(&mut self, raw: &str) -> Result<(), ParseFailure> {
        *self = P::parse_text(raw).map_err(|e| ParseFailure::new(raw, e))?;
        Ok(())
    }

    fn set_value(&mut self, value: &Value) -> bool {
        match P::from_value(value) {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }

    fn to_value(&self) -> Value {
        Primitive::to_driver(self)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<P: Primitive> ListField for Vec<P> {
    fn expected(&self) -> &'static str {
        P::EXPECTED
    }

    fn set_texts(&mut self, raw: &[String]) -> Result<(), ParseFailure> {
        let parsed = raw
            .iter()
            .map(|r| P::parse_text(r).map_err(|e| ParseFailure::new(r.as_str(), e)))
            .collect::<Result<Vec<_>, _>>()?;
        *self = parsed;
        Ok(())
    }

    fn set_values(&mut self, values: &[Value]) -> Result<(), ParseFailure> {
        let converted = values
            .iter()
            .map(|value| {
                if let Some(v) = P::from_value(value) {
                    return Ok(v);
                }
                match value.as_text() {
                    Some(text) => P::parse_text(&text).map_err(|e| ParseFailure::new(text, e)),
                    None => Err(ParseFailure::new(
                        value.kind(),
                        format!("a {} can't be an element of a list", value.kind()),
                    )),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        *self = converted;
        Ok(())
    }

    fn to_values(&self) -> Vec<Value> {
        self.iter().map(Primitive::to_driver).collect()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<P: Primitive> BindField for Vec<P> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::List(self)
    }
}
