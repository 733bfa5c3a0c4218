//! Tri-state manifest fields.
//!
//! Every mergeable scalar in a manifest is a [`Field`]. A field is either
//! unset (inherit whatever the base says), present with the zero value
//! (explicitly cleared), or present with a value. Unset and present-empty are
//! different states and must never be collapsed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value slot that distinguishes "absent" from "explicitly set".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not given; inherits from the base configuration.
    Unset,
    /// Explicitly given, possibly the zero value of `T`.
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> Field<T> {
    /// Create a present field.
    pub fn new(value: T) -> Self {
        Field::Value(value)
    }

    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Unset,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    /// The value, if present.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Unset => None,
        }
    }

    /// Query as `(value, is_present)`.
    pub fn get(&self) -> (Option<&T>, bool) {
        (self.value(), self.is_present())
    }

    /// Set the field to `value`, including the zero value.
    pub fn set(&mut self, value: T) {
        *self = Field::Value(value);
    }

    /// Return the field to the unset state.
    pub fn unset(&mut self) {
        *self = Field::Unset;
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Value(v) => Field::Value(v),
            Field::Unset => Field::Unset,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Unset => None,
        }
    }
}

impl<T: Default> Field<T> {
    /// A present field holding the zero value.
    pub fn empty() -> Self {
        Field::Value(T::default())
    }

    /// Explicitly clear the field to its zero value (present-empty).
    pub fn clear(&mut self) {
        *self = Field::Value(T::default());
    }
}

impl<T: Default + PartialEq> Field<T> {
    /// True when present and equal to the zero value.
    pub fn is_empty_value(&self) -> bool {
        matches!(self, Field::Value(v) if *v == T::default())
    }
}

impl Field<String> {
    /// The string value when present and non-empty.
    pub fn non_empty(&self) -> Option<&str> {
        match self {
            Field::Value(v) if !v.is_empty() => Some(v.as_str()),
            _ => None,
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Unset => serializer.serialize_none(),
        }
    }
}

// A missing key never reaches this impl (fields carry `#[serde(default)]`);
// an explicit `null` is treated the same as a missing key.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from_option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Field::is_unset")]
        path: Field<String>,
        #[serde(default, skip_serializing_if = "Field::is_unset")]
        count: Field<u32>,
    }

    #[test]
    fn test_three_states_are_distinct() {
        let unset: Field<String> = Field::Unset;
        let empty: Field<String> = Field::empty();
        let value = Field::new("/api".to_string());

        assert_eq!(unset.get(), (None, false));
        assert_eq!(empty.get(), (Some(&String::new()), true));
        assert_eq!(value.get(), (Some(&"/api".to_string()), true));
        assert_ne!(unset, empty);
        assert!(empty.is_empty_value());
        assert!(!unset.is_empty_value());
    }

    #[test]
    fn test_set_clear_unset() {
        let mut field = Field::new(512u32);
        field.clear();
        assert_eq!(field, Field::Value(0));
        field.unset();
        assert!(field.is_unset());
        field.set(0);
        assert!(field.is_present());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(Field::new("x".to_string()).non_empty(), Some("x"));
        assert_eq!(Field::<String>::empty().non_empty(), None);
        assert_eq!(Field::<String>::Unset.non_empty(), None);
    }

    #[test]
    fn test_deserialize_missing_null_and_zero() {
        let missing: Probe = serde_yaml::from_str("{}").unwrap();
        assert!(missing.path.is_unset());
        assert!(missing.count.is_unset());

        let null: Probe = serde_yaml::from_str("path: ~\ncount: null\n").unwrap();
        assert!(null.path.is_unset());
        assert!(null.count.is_unset());

        let zero: Probe = serde_yaml::from_str("path: ''\ncount: 0\n").unwrap();
        assert_eq!(zero.path, Field::Value(String::new()));
        assert_eq!(zero.count, Field::Value(0));
    }

    #[test]
    fn test_serialize_skips_unset_keeps_empty() {
        let probe = Probe {
            path: Field::empty(),
            count: Field::Unset,
        };
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "" }));
    }
}
