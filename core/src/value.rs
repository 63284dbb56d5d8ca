//! Cell values and null canonicalization

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of a [`crate::table::Table`].
///
/// Values are loosely typed the way spreadsheet exports are: every cell is one of
/// a closed set of variants. Not-a-number is never observed by comparison code:
/// [`CellValue::canonical`] folds it into [`CellValue::Null`], and equality and
/// hashing are defined on the canonical form so `NaN == Null` holds.
///
/// In JSON, values are written untagged except dates, which are written as
/// `{"date": "YYYY-MM-DD"}` so that date-like strings stay strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Date(#[serde(with = "tagged_date")] NaiveDate),
    String(String),
}

mod tagged_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TaggedDate {
        date: NaiveDate,
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedDate { date: *date }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        TaggedDate::deserialize(deserializer).map(|tagged| tagged.date)
    }
}

impl CellValue {
    /// Fold every "no data" representation into `Null`
    pub fn canonical(&self) -> CellValue {
        match self {
            CellValue::Number(n) if n.is_nan() => CellValue::Null,
            // -0.0 and 0.0 compare equal, keep them hashing the same way
            CellValue::Number(n) if *n == 0.0 => CellValue::Number(0.0),
            other => other.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// Short type name, used in error and log messages
    pub fn type_name(&self) -> &'static str {
        match self.canonical() {
            CellValue::Null => "null",
            CellValue::Bool(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::Date(_) => "date",
            CellValue::String(_) => "string",
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical(), other.canonical()) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Number(a), CellValue::Number(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::String(a), CellValue::String(b)) => a == b,
            _ => false,
        }
    }
}

// Canonical values never hold NaN, so equality is reflexive.
impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.canonical() {
            CellValue::Null => 0u8.hash(state),
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Number(n) => {
                2u8.hash(state);
                n.to_bits().hash(state);
            }
            CellValue::Date(d) => {
                3u8.hash(state);
                d.hash(state);
            }
            CellValue::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical() {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::String(s) => f.write_str(&s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nan_is_null() {
        assert!(CellValue::Number(f64::NAN).is_null());
        assert_eq!(CellValue::Number(f64::NAN), CellValue::Null);
        assert_eq!(CellValue::Number(f64::NAN).canonical(), CellValue::Null);
    }

    #[test]
    fn test_null_differs_from_values() {
        assert_ne!(CellValue::Null, CellValue::from(""));
        assert_ne!(CellValue::Null, CellValue::from(0));
        assert_ne!(CellValue::Null, CellValue::from(false));
    }

    #[test]
    fn test_variants_do_not_cross_compare() {
        assert_ne!(CellValue::from("1"), CellValue::from(1));
        assert_ne!(CellValue::from(1), CellValue::from(true));
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(CellValue::Number(f64::NAN));
        set.insert(CellValue::Null);
        set.insert(CellValue::Number(0.0));
        set.insert(CellValue::Number(-0.0));
        set.insert(CellValue::from(2));
        set.insert(CellValue::Number(2.0));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::from(42).to_string(), "42");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Null.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2021, 12, 14).unwrap();
        assert_eq!(CellValue::from(date).to_string(), "2021-12-14");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(CellValue::from(None::<&str>), CellValue::Null);
        assert_eq!(CellValue::from(Some("A")), CellValue::from("A"));
    }

    #[test]
    fn test_untagged_json_roundtrip_of_mixed_row() {
        let row: Vec<CellValue> = serde_json::from_str(r#"[1, "A", null, true]"#).unwrap();
        assert_eq!(
            row,
            vec![CellValue::from(1), CellValue::from("A"), CellValue::Null, CellValue::from(true)]
        );
    }

    #[test]
    fn test_date_like_string_stays_a_string() {
        let value = CellValue::from("2021-12-14");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#""2021-12-14""#);

        let back: CellValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
        assert_eq!(back.type_name(), "string");
    }

    #[test]
    fn test_date_json_roundtrip() {
        let value = CellValue::from(NaiveDate::from_ymd_opt(2021, 12, 14).unwrap());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"date":"2021-12-14"}"#);

        let back: CellValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
        assert_eq!(back.type_name(), "date");
    }
}
