//! Backend-neutral document values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A single field value inside a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    /// Placeholder the backend replaces with its commit time.
    ServerTimestamp,
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the nested fields, if this is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Replace every [`FieldValue::ServerTimestamp`] with `at`, recursively.
    pub fn resolve_server_time(&mut self, at: DateTime<Utc>) {
        match self {
            Self::ServerTimestamp => *self = Self::Timestamp(at),
            Self::Array(values) => values.iter_mut().for_each(|v| v.resolve_server_time(at)),
            Self::Map(fields) => fields.values_mut().for_each(|v| v.resolve_server_time(at)),
            _ => {}
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<Document> for FieldValue {
    fn from(document: Document) -> Self {
        Self::Map(document.fields)
    }
}

/// An ordered set of named fields.
///
/// Field order is alphabetical, which keeps request bodies stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    /// Insert `value` only when present.
    #[must_use]
    pub fn with_opt(self, name: &str, value: Option<impl Into<FieldValue>>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Drop a top-level field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// All top-level fields in name order.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Whether any field, at any depth, is a server timestamp placeholder.
    #[must_use]
    pub fn has_server_timestamps(&self) -> bool {
        fn contains(value: &FieldValue) -> bool {
            match value {
                FieldValue::ServerTimestamp => true,
                FieldValue::Array(values) => values.iter().any(contains),
                FieldValue::Map(fields) => fields.values().any(contains),
                _ => false,
            }
        }
        self.fields.values().any(contains)
    }

    /// Replace every server timestamp placeholder with `at`.
    pub fn resolve_server_time(&mut self, at: DateTime<Utc>) {
        self.fields
            .values_mut()
            .for_each(|value| value.resolve_server_time(at));
    }
}

impl From<BTreeMap<String, FieldValue>> for Document {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_builder_skips_absent_optionals() {
        let doc = Document::new()
            .with("name", "Bananas")
            .with_opt("note", None::<String>)
            .with_opt("price", Some("$1.00"));

        assert_eq!(doc.get("name"), Some(&FieldValue::from("Bananas")));
        assert!(doc.get("note").is_none());
        assert_eq!(doc.get("price").and_then(FieldValue::as_str), Some("$1.00"));
    }

    #[test]
    fn test_resolve_server_time_reaches_nested_values() {
        let nested = Document::new().with("updatedAt", FieldValue::ServerTimestamp);
        let mut doc = Document::new()
            .with("createdAt", FieldValue::ServerTimestamp)
            .with("settings", nested);
        assert!(doc.has_server_timestamps());

        let Some(at) = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single() else {
            panic!("valid date");
        };
        doc.resolve_server_time(at);

        assert!(!doc.has_server_timestamps());
        assert_eq!(doc.get("createdAt"), Some(&FieldValue::Timestamp(at)));
        let settings = doc.get("settings").and_then(FieldValue::as_map);
        assert_eq!(
            settings.and_then(|s| s.get("updatedAt")),
            Some(&FieldValue::Timestamp(at))
        );
    }
}
