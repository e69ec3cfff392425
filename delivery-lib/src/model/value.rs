//! Value enum for dynamic field values

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

/// A dynamic value read from a row.
///
/// Table rows expose their fields as `Value`s so the table engine can search
/// and sort any resource without knowing its concrete type.
///
/// # Example
///
/// ```
/// use delivery_lib::model::Value;
///
/// let name = Value::from("Pizza");
/// let price = Value::from(12.5);
/// let missing = Value::from(None::<i64>);
/// assert!(missing.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null or missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Date and time (UTC, without offset).
    DateTime(NaiveDateTime),
    /// String value.
    String(String),
    /// Fallback for nested objects and arrays.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::DateTime(_) => "datetime",
            Value::String(_) => "string",
            Value::Json(_) => "json",
        }
    }

    /// Returns the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is an integral number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, if it is any number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::DateTime(_) => 2,
            Value::String(_) => 3,
            Value::Json(_) => 4,
            Value::Null => 5,
        }
    }

    /// Total order used when sorting table rows in ascending direction.
    ///
    /// Numbers compare numerically (integers and floats mix), strings
    /// lexicographically, values of different kinds by kind. `Null` sorts
    /// after every defined value; callers sorting descending must keep that
    /// placement (see [`Value::sort_cmp_directed`]).
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Json(a), Value::Json(b)) => a.to_string().cmp(&b.to_string()),
            (Value::Float(a), Value::Float(b)) => zero(*a).total_cmp(&zero(*b)),
            (Value::Int(a), Value::Float(b)) => int_float_cmp(*a, *b),
            (Value::Float(a), Value::Int(b)) => int_float_cmp(*b, *a).reverse(),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    /// Like [`Value::sort_cmp`] but reversed for descending order, with nulls
    /// still placed last.
    pub fn sort_cmp_directed(&self, other: &Value, ascending: bool) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) if ascending => self.sort_cmp(other),
            (false, false) => self.sort_cmp(other).reverse(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::String(s) => f.write_str(s),
            Value::Json(j) => write!(f, "{}", j),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}

/// `-0.0` and `0.0` compare equal, as they do against `Int(0)`.
fn zero(f: f64) -> f64 {
    if f == 0.0 { 0.0 } else { f }
}

/// Exact comparison of an integer with a float, without rounding the integer.
fn int_float_cmp(i: i64, f: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }

    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if f > whole => Ordering::Less,
        Ordering::Equal if f < whole => Ordering::Greater,
        unequal => unequal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_across_kinds() {
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).sort_cmp(&Value::Int(3)), Ordering::Equal);
        assert_eq!(Value::Int(10).sort_cmp(&Value::Int(9)), Ordering::Greater);
        assert_eq!(Value::Int(-1).sort_cmp(&Value::Float(-0.5)), Ordering::Less);
        assert_eq!(Value::Int(0).sort_cmp(&Value::Float(-0.0)), Ordering::Equal);
        assert_eq!(Value::Float(-0.0).sort_cmp(&Value::Float(0.0)), Ordering::Equal);
    }

    #[test]
    fn test_large_integers_stay_ordered_against_floats() {
        let big = 1_i64 << 53;
        let float = Value::Float(big as f64);

        assert_eq!(Value::Int(big).sort_cmp(&float), Ordering::Equal);
        assert_eq!(Value::Int(big + 1).sort_cmp(&float), Ordering::Greater);
        assert_eq!(float.sort_cmp(&Value::Int(big + 1)), Ordering::Less);
        assert_eq!(Value::Int(i64::MAX).sort_cmp(&Value::Float(9.3e18)), Ordering::Less);
        assert_eq!(Value::Int(i64::MIN).sort_cmp(&Value::Float(-1e19)), Ordering::Greater);
        assert_eq!(Value::Int(i64::MAX).sort_cmp(&Value::Float(f64::NAN)), Ordering::Less);

        let mut values = vec![
            Value::Int(big + 1),
            Value::Float(big as f64),
            Value::Int(big - 1),
            Value::Int(big),
            Value::Float(big as f64 + 2.0),
        ];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(
            values,
            vec![
                Value::Int(big - 1),
                Value::Float(big as f64),
                Value::Int(big),
                Value::Int(big + 1),
                Value::Float(big as f64 + 2.0),
            ]
        );
    }

    #[test]
    fn test_strings_are_lexicographic() {
        assert_eq!(Value::from("B").sort_cmp(&Value::from("A")), Ordering::Greater);
        assert_eq!(Value::from("10").sort_cmp(&Value::from("9")), Ordering::Less);
    }

    #[test]
    fn test_null_sorts_last_in_both_directions() {
        let null = Value::Null;
        let one = Value::Int(1);
        assert_eq!(null.sort_cmp_directed(&one, true), Ordering::Greater);
        assert_eq!(null.sort_cmp_directed(&one, false), Ordering::Greater);
        assert_eq!(one.sort_cmp_directed(&null, false), Ordering::Less);
        assert_eq!(null.sort_cmp_directed(&Value::Null, false), Ordering::Equal);
    }

    #[test]
    fn test_mixed_kinds_use_rank() {
        assert_eq!(Value::Int(99).sort_cmp(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::Bool(true).sort_cmp(&Value::Int(0)), Ordering::Less);
    }

    #[test]
    fn test_display_is_search_text() {
        assert_eq!(Value::from("Pizza").to_string(), "Pizza");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from(serde_json::json!(3)), Value::Int(3));
        assert_eq!(Value::from(serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from(serde_json::json!(null)), Value::Null);
        assert!(matches!(Value::from(serde_json::json!({"a": 1})), Value::Json(_)));
    }
}
