//! Scalars that track whether they hold a value.
//!
//! A [`Nullable<T>`] is a value plus a validity flag. It bridges three notions of
//! "nothing": a database `NULL`, a JSON `null` and a form field that was never set.
//!
//! | Surface           | Invalid (`valid == false`) | Valid              |
//! |-------------------|----------------------------|--------------------|
//! | [`Scannable::value`] | [`Value::Null`]         | the payload        |
//! | JSON (serde)      | `null`                     | the payload        |
//! | Forms             | field left untouched       | parsed from text   |
//!
//! The list variants ([`NullableList<T>`]) are lenient: when scanning, elements that
//! can't be converted are dropped instead of failing the whole scan.
use std::any::Any;
use std::fmt;

use jiff::civil;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::errors::ScanError;
use crate::field::{BindField, CustomField, Primitive, Slot};
use crate::value::{DATE_FORMAT, DATE_TIME_FORMAT, Value};

#[cfg(feature = "rusqlite")]
mod sqlite;

pub type NullString = Nullable<String>;
pub type NullInt = Nullable<isize>;
pub type NullInt32 = Nullable<i32>;
pub type NullInt64 = Nullable<i64>;
pub type NullFloat32 = Nullable<f32>;
pub type NullFloat64 = Nullable<f64>;
pub type NullBool = Nullable<bool>;
/// A nullable calendar date, rendered as `%Y-%m-%d`.
pub type NullDate = Nullable<civil::Date>;
/// A nullable civil datetime, rendered as `%Y-%m-%d %H:%M:%S`.
pub type NullTime = Nullable<civil::DateTime>;

pub type NullStrings = NullableList<String>;
pub type NullInts = NullableList<isize>;
pub type NullInt32s = NullableList<i32>;
pub type NullInt64s = NullableList<i64>;
pub type NullFloat32s = NullableList<f32>;
pub type NullFloat64s = NullableList<f64>;

/// A type that can be populated from a dynamic [`Value`], database-driver style.
pub trait Scannable {
    /// Assign `raw`.
    ///
    /// [`Value::Null`] marks the value as invalid without failing.
    /// On failure, the value is marked as invalid and reset to its zero value.
    fn scan(&mut self, raw: Value) -> Result<(), ScanError>;

    /// The value to hand to a database driver: [`Value::Null`] if invalid.
    fn value(&self) -> Value;

    fn is_valid(&self) -> bool;

    /// How the values submitted for a form field are presented to [`scan`](Scannable::scan).
    fn form_value(values: &[String]) -> Value
    where
        Self: Sized;
}

/// The payload types of [`Nullable`] and [`NullableList`].
pub trait ScanTarget: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    const EXPECTED: &'static str;

    fn from_driver(value: Value) -> Result<Self, ScanError>;

    fn to_driver(&self) -> Value;

    fn serialize_json<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;
}

macro_rules! primitive_targets {
    ($($t:ty),* $(,)?) => {
        $(
            impl ScanTarget for $t {
                const EXPECTED: &'static str = <$t as Primitive>::EXPECTED;

                fn from_driver(value: Value) -> Result<Self, ScanError> {
                    <$t as Primitive>::from_driver(value)
                }

                fn to_driver(&self) -> Value {
                    <$t as Primitive>::to_driver(self)
                }

                fn serialize_json<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    Serialize::serialize(self, serializer)
                }
            }
        )*
    };
}

primitive_targets!(String, isize, i32, i64, f32, f64, bool);

fn parse_civil<T>(
    raw: String,
    expected: &'static str,
    formats: &[&str],
    parse: impl Fn(&str, &str) -> Result<T, jiff::Error>,
) -> Result<T, ScanError> {
    let mut last_error = None;
    for &format in formats {
        match parse(format, raw.as_str()) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => last_error = Some(e),
        }
    }
    Err(ScanError::Parse {
        expected,
        reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
        raw,
    })
}

fn civil_text(expected: &'static str, value: Value) -> Result<String, ScanError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Bytes(b) => Ok(String::from_utf8_lossy(&b).into_owned()),
        other => Err(ScanError::Incompatible {
            expected,
            found: other.kind(),
        }),
    }
}

impl ScanTarget for civil::Date {
    const EXPECTED: &'static str = "Date";

    fn from_driver(value: Value) -> Result<Self, ScanError> {
        match value {
            Value::Date(date) => Ok(date),
            Value::DateTime(datetime) => Ok(datetime.date()),
            other => {
                let raw = civil_text(Self::EXPECTED, other)?;
                parse_civil(raw, Self::EXPECTED, &[DATE_FORMAT, DATE_TIME_FORMAT], |f, s| {
                    civil::DateTime::strptime(f, s)
                        .map(|dt| dt.date())
                        .or_else(|_| civil::Date::strptime(f, s))
                })
            }
        }
    }

    fn to_driver(&self) -> Value {
        Value::Date(*self)
    }

    fn serialize_json<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.strftime(DATE_FORMAT))
    }
}

impl ScanTarget for civil::DateTime {
    const EXPECTED: &'static str = "DateTime";

    fn from_driver(value: Value) -> Result<Self, ScanError> {
        match value {
            Value::DateTime(datetime) => Ok(datetime),
            Value::Date(date) => Ok(date.to_datetime(civil::Time::midnight())),
            other => {
                let raw = civil_text(Self::EXPECTED, other)?;
                parse_civil(
                    raw,
                    Self::EXPECTED,
                    &[DATE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", DATE_FORMAT],
                    |f, s| {
                        civil::DateTime::strptime(f, s).or_else(|_| {
                            civil::Date::strptime(f, s)
                                .map(|date| date.to_datetime(civil::Time::midnight()))
                        })
                    },
                )
            }
        }
    }

    fn to_driver(&self) -> Value {
        Value::DateTime(*self)
    }

    fn serialize_json<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.strftime(DATE_TIME_FORMAT))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A scalar that may be `NULL`.
///
/// When `valid` is `false`, `val` holds the zero value of `T`.
pub struct Nullable<T> {
    pub val: T,
    pub valid: bool,
}

impl<T: ScanTarget> Nullable<T> {
    /// A valid value.
    pub fn new(val: T) -> Self {
        Self { val, valid: true }
    }

    /// An invalid value.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&T> {
        self.valid.then_some(&self.val)
    }

    pub fn into_option(self) -> Option<T> {
        self.valid.then_some(self.val)
    }
}

impl<T: ScanTarget> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(val) => Self::new(val),
            None => Self::null(),
        }
    }
}

impl<T: ScanTarget> Scannable for Nullable<T> {
    fn scan(&mut self, raw: Value) -> Result<(), ScanError> {
        if raw.is_null() {
            *self = Self::null();
            return Ok(());
        }
        match T::from_driver(raw) {
            Ok(val) => {
                *self = Self::new(val);
                Ok(())
            }
            Err(e) => {
                *self = Self::null();
                Err(e)
            }
        }
    }

    fn value(&self) -> Value {
        if self.valid {
            self.val.to_driver()
        } else {
            Value::Null
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn form_value(values: &[String]) -> Value {
        values
            .first()
            .map(|v| Value::Text(v.clone()))
            .unwrap_or_default()
    }
}

impl<T: ScanTarget> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.valid {
            self.val.serialize_json(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T: ScanTarget> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let mut scanned = Self::null();
        scanned.scan(raw).map_err(D::Error::custom)?;
        Ok(scanned)
    }
}

impl<T: ScanTarget> CustomField for Nullable<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn to_value(&self) -> Option<Value> {
        Some(self.value())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: ScanTarget> BindField for Nullable<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Custom(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A list of scalars that may be `NULL` as a whole.
///
/// Scanning requires a [`Value::List`]. Elements that can't be converted into `T`
/// are skipped: scanning `["1", "x", "3"]` into a [`NullInt32s`] yields `[1, 3]`.
pub struct NullableList<T> {
    pub val: Vec<T>,
    pub valid: bool,
}

impl<T: ScanTarget> NullableList<T> {
    pub fn new(val: Vec<T>) -> Self {
        Self { val, valid: true }
    }

    pub fn null() -> Self {
        Self::default()
    }
}

impl<T: ScanTarget> Scannable for NullableList<T> {
    fn scan(&mut self, raw: Value) -> Result<(), ScanError> {
        let items = match raw {
            Value::Null => {
                *self = Self::null();
                return Ok(());
            }
            Value::List(items) => items,
            other => {
                *self = Self::null();
                return Err(ScanError::Incompatible {
                    expected: "a list",
                    found: other.kind(),
                });
            }
        };
        let mut val = Vec::with_capacity(items.len());
        for item in items {
            match T::from_driver(item) {
                Ok(v) => val.push(v),
                Err(e) => {
                    tracing::trace!(error.msg = %e, "Skipping a list element that can't be scanned");
                }
            }
        }
        *self = Self::new(val);
        Ok(())
    }

    fn value(&self) -> Value {
        if self.valid {
            Value::List(self.val.iter().map(ScanTarget::to_driver).collect())
        } else {
            Value::Null
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn form_value(values: &[String]) -> Value {
        Value::List(values.iter().cloned().map(Value::Text).collect())
    }
}

struct JsonElement<'a, T>(&'a T);

impl<T: ScanTarget> Serialize for JsonElement<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize_json(serializer)
    }
}

impl<T: ScanTarget> Serialize for NullableList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.valid {
            serializer.collect_seq(self.val.iter().map(JsonElement))
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T: ScanTarget> Deserialize<'de> for NullableList<T> {
    /// Accepts `null` or a sequence.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<Value>>::deserialize(deserializer)?
            .map(Value::List)
            .unwrap_or_default();
        let mut scanned = Self::null();
        scanned.scan(raw).map_err(D::Error::custom)?;
        Ok(scanned)
    }
}

impl<T: ScanTarget> CustomField for NullableList<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn to_value(&self) -> Option<Value> {
        Some(self.value())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: ScanTarget> BindField for NullableList<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Custom(self)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn scanning_null_marks_the_value_as_invalid() {
        let mut n = NullInt64::new(7);
        n.scan(Value::Null).unwrap();
        assert_eq!(n, NullInt64::null());
        assert_eq!(n.value(), Value::Null);
    }

    #[test]
    fn failed_scans_reset_to_zero() {
        let mut n = NullInt32::new(7);
        let err = n.scan(Value::from("seven")).unwrap_err();
        insta::assert_snapshot!(err, @"Can't scan `seven` into `i32`: invalid digit found in string");
        assert!(!n.valid);
        assert_eq!(n.val, 0);
    }

    #[test]
    fn null_round_trips_through_json() {
        fn check<T: ScanTarget>() {
            let mut n = Nullable::<T>::new(T::default());
            n.scan(Value::Null).unwrap();
            assert_eq!(serde_json::to_string(&n).unwrap(), "null");
            let back: Nullable<T> = serde_json::from_str("null").unwrap();
            assert!(!back.valid);

            let mut list = NullableList::<T>::new(vec![T::default()]);
            list.scan(Value::Null).unwrap();
            assert_eq!(serde_json::to_string(&list).unwrap(), "null");
            let back: NullableList<T> = serde_json::from_str("null").unwrap();
            assert!(!back.valid);
        }
        check::<String>();
        check::<isize>();
        check::<i32>();
        check::<i64>();
        check::<f32>();
        check::<f64>();
        check::<bool>();
        check::<civil::Date>();
        check::<civil::DateTime>();
    }

    #[test]
    fn valid_values_serialize_as_their_payload() {
        assert_eq!(serde_json::to_string(&NullFloat32::new(0.1)).unwrap(), "0.1");
        assert_eq!(serde_json::to_string(&NullBool::new(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&NullDate::new(date(2024, 3, 1))).unwrap(),
            r#""2024-03-01""#
        );
        assert_eq!(
            serde_json::to_string(&NullTime::new(date(2024, 3, 1).at(9, 30, 0, 0))).unwrap(),
            r#""2024-03-01 09:30:00""#
        );
    }

    #[test]
    fn json_input_goes_through_scan() {
        let n: NullInt32 = serde_json::from_str(r#""12""#).unwrap();
        assert_eq!(n.get(), Some(&12));
        let n: NullString = serde_json::from_str("12").unwrap();
        assert_eq!(n.get().map(String::as_str), Some("12"));
        let n: NullDate = serde_json::from_str(r#""2024-03-01 10:00:00""#).unwrap();
        assert_eq!(n.get(), Some(&date(2024, 3, 1)));

        let err = serde_json::from_str::<NullInt32>("true").unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Can't scan a boolean value into `i32`."),
            "{err}"
        );
    }

    #[test]
    fn list_scans_skip_unconvertible_elements() {
        let mut n = NullInt32s::default();
        n.scan(Value::List(vec![
            Value::from("1"),
            Value::from("x"),
            Value::Int(3),
        ]))
        .unwrap();
        assert!(n.valid);
        assert_eq!(n.val, vec![1, 3]);
    }

    #[test]
    fn pointer_sized_integers_scan_like_the_others() {
        let mut n = NullInt::null();
        n.scan(Value::from("-42")).unwrap();
        assert_eq!(n.get(), Some(&-42));

        let mut list = NullInts::null();
        list.scan(Value::List(vec![Value::Int(1), Value::from("x"), Value::Float(2.0)]))
            .unwrap();
        assert_eq!(list.val, vec![1, 2]);
    }

    #[test]
    fn list_scans_replace_the_previous_payload() {
        let mut n = NullStrings::new(vec!["old".into()]);
        n.scan(Value::List(vec![Value::from("new")])).unwrap();
        assert_eq!(n.val, vec!["new"]);
    }

    #[test]
    fn list_scans_require_a_list() {
        let mut n = NullFloat64s::new(vec![1.0]);
        let err = n.scan(Value::Float(2.0)).unwrap_err();
        insta::assert_snapshot!(err, @"Can't scan a float value into `a list`.");
        assert_eq!(n, NullFloat64s::null());
    }

    #[test]
    fn driver_values_are_the_payload() {
        assert_eq!(NullInt32::new(5).value(), Value::Int(5));
        assert_eq!(NullInt::new(-2).value(), Value::Int(-2));
        assert_eq!(
            NullInts::new(vec![3]).value(),
            Value::List(vec![Value::Int(3)])
        );
        assert_eq!(
            NullInt64s::new(vec![1, 2]).value(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(NullDate::new(date(2020, 1, 1)).value(), Value::Date(date(2020, 1, 1)));
    }
}
