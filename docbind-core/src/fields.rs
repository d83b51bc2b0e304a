//! The ordered field map backing every in-memory document.
//!
//! A [`FieldMap`] is a thin newtype over [`bson::Document`], which preserves
//! insertion order. It replaces the dynamic attribute bag of loosely-typed
//! document mappers with an explicit value type: typed accessors for the common
//! cases plus a generic key/value escape hatch for schema-less fields.
//!
//! The reserved `_id` key never lives inside a `FieldMap`; document
//! constructors extract it into the document identity before building the map.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Ordered mapping from field name to BSON value for one document.
///
/// # Example
///
/// ```ignore
/// use docbind::fields::FieldMap;
/// use bson::doc;
///
/// let mut fields = FieldMap::from(doc! { "name": "Alice" });
/// fields.insert("age", 30);
/// assert_eq!(fields.get_str("name"), Some("Alice"));
/// assert_eq!(fields.get_i64("age"), Some(30));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(Document);

impl FieldMap {
    /// Creates an empty field map.
    pub fn new() -> Self {
        Self(Document::new())
    }

    /// Returns the number of fields in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map holds no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Bson>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the raw BSON value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&Bson> {
        self.0.get(name)
    }

    /// Removes a field from the map, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Bson> {
        self.0.remove(name)
    }

    /// Returns `true` if a field with the given name is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bson)> {
        self.0.iter()
    }

    /// Iterates over field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns a string field, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(Bson::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns an integer field widened to `i64`, if present and an integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(Bson::Int32(value)) => Some(*value as i64),
            Some(Bson::Int64(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns a floating-point field, if present and a double.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(Bson::Double(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns a boolean field, if present and a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(Bson::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns a timestamp field, if present and a datetime.
    pub fn get_datetime(&self, name: &str) -> Option<bson::DateTime> {
        match self.0.get(name) {
            Some(Bson::DateTime(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns a timestamp field as a chrono UTC datetime.
    pub fn get_datetime_utc(&self, name: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        self.get_datetime(name).map(|dt| dt.to_chrono())
    }

    /// Returns a nested mapping field, if present and a mapping.
    pub fn get_map(&self, name: &str) -> Option<FieldMap> {
        match self.0.get(name) {
            Some(Bson::Document(value)) => Some(FieldMap(value.clone())),
            _ => None,
        }
    }

    /// Borrows the underlying ordered BSON document.
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    /// Consumes the map and returns the underlying BSON document.
    pub fn into_document(self) -> Document {
        self.0
    }

    /// Converts the map into a pure JSON tree.
    ///
    /// Timestamps become fractional epoch seconds and object ids become their
    /// hex string form, recursively through nested mappings and arrays. The
    /// result is composed only of null/bool/number/string/array/object values.
    pub fn to_json_value(&self) -> Value {
        document_to_json(&self.0)
    }
}

impl From<Document> for FieldMap {
    fn from(document: Document) -> Self {
        Self(document)
    }
}

impl From<FieldMap> for Document {
    fn from(fields: FieldMap) -> Self {
        fields.0
    }
}

impl From<FieldMap> for Bson {
    fn from(fields: FieldMap) -> Self {
        Bson::Document(fields.0)
    }
}

impl FromIterator<(String, Bson)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, Bson)>>(iter: I) -> Self {
        Self(Document::from_iter(iter))
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Bson);
    type IntoIter = <Document as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Rewrites a single BSON value into its JSON export form.
pub(crate) fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Number(Number::from(*i)),
        Bson::Int64(i) => Value::Number(Number::from(*i)),
        Bson::Double(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        // Fractional epoch seconds, matching the wire-agnostic export format.
        Bson::DateTime(dt) => Number::from_f64(dt.timestamp_millis() as f64 / 1000.0)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => Value::String(other.to_string()),
    }
}

fn document_to_json(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(k, v)| (k.clone(), bson_to_json(v)))
            .collect::<Map<String, Value>>(),
    )
}
