//! Attribute values as they appear in the OSIRIS file convention.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single attribute value from an OSIRIS HDF5 file.
///
/// The convention is loosely typed: a key may carry text (persisted on
/// disk as a 1-element byte-string sequence), a numeric scalar, or a
/// numeric sequence. The scalar/sequence distinction is preserved so
/// that a value written back to disk has the same shape it was read
/// with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttrValue {
    /// Text value (a decoded byte string).
    Text(String),
    /// Scalar integer.
    Int(i64),
    /// Scalar float.
    Float(f64),
    /// Integer sequence.
    IntVec(Vec<i64>),
    /// Float sequence.
    FloatVec(Vec<f64>),
}

impl AttrValue {
    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(value: Vec<i64>) -> Self {
        Self::IntVec(value)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(value: Vec<f64>) -> Self {
        Self::FloatVec(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_impls() {
        assert_eq!(AttrValue::from("e1"), AttrValue::Text("e1".to_string()));
        assert_eq!(AttrValue::from(3_i64), AttrValue::Int(3));
        assert_eq!(AttrValue::from(vec![1.0, 2.0]), AttrValue::FloatVec(vec![1.0, 2.0]));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(AttrValue::from("grid").as_text(), Some("grid"));
        assert_eq!(AttrValue::Float(1.0).as_text(), None);
    }

    #[test]
    fn test_scalar_and_sequence_are_distinct() {
        assert_ne!(AttrValue::Float(1.0), AttrValue::FloatVec(vec![1.0]));
    }
}
