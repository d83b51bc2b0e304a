//! Optional per-collection schema validation.
//!
//! A [`Schema`] maps field names to [`FieldSpec`] descriptors (declared type,
//! required flag, optional validator predicate). Schemas are authored
//! externally and attached to a collection binding at configuration time; they
//! are enforced only when a document is saved, never on individual mutations.

use std::fmt;
use std::sync::Arc;

use bson::Bson;
use indexmap::IndexMap;

use crate::error::{DocBindError, DocBindResult};
use crate::fields::FieldMap;

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    String,
    DateTime,
    Array,
    Map,
    ObjectId,
    /// Accepts any value; useful for fields validated only by a predicate.
    Any,
}

impl FieldType {
    fn matches(&self, value: &Bson) -> bool {
        match (self, value) {
            (FieldType::Bool, Bson::Boolean(_)) => true,
            (FieldType::Int, Bson::Int32(_) | Bson::Int64(_)) => true,
            (FieldType::Float, Bson::Double(_)) => true,
            (FieldType::String, Bson::String(_)) => true,
            (FieldType::DateTime, Bson::DateTime(_)) => true,
            (FieldType::Array, Bson::Array(_)) => true,
            (FieldType::Map, Bson::Document(_)) => true,
            (FieldType::ObjectId, Bson::ObjectId(_)) => true,
            (FieldType::Any, _) => true,
            _ => false,
        }
    }
}

/// A custom validation predicate for a single field value.
pub type Validator = Arc<dyn Fn(&Bson) -> bool + Send + Sync>;

/// Descriptor for a single schema field: `{type, required, validator?}`.
#[derive(Clone)]
pub struct FieldSpec {
    field_type: FieldType,
    required: bool,
    validator: Option<Validator>,
}

impl FieldSpec {
    /// A field that must be present and non-null on every saved document.
    pub fn required(field_type: FieldType) -> Self {
        Self { field_type, required: true, validator: None }
    }

    /// A field that may be absent or null.
    pub fn optional(field_type: FieldType) -> Self {
        Self { field_type, required: false, validator: None }
    }

    /// Attaches a custom predicate run against the field value (or `Bson::Null`
    /// when the field is absent) before the type and required checks.
    pub fn with_validator(mut self, validator: impl Fn(&Bson) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Schema for one collection: field name → descriptor, in declaration order.
///
/// # Example
///
/// ```ignore
/// use docbind::schema::{Schema, FieldSpec, FieldType};
///
/// let schema = Schema::new()
///     .field("name", FieldSpec::required(FieldType::String))
///     .field("age", FieldSpec::optional(FieldType::Int)
///         .with_validator(|v| v.as_i64().is_none_or(|age| age >= 0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field, replacing any previous descriptor under the same name.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Validates a field map against this schema.
    ///
    /// Checks, in order, for every declared field: the custom validator (fed
    /// `Bson::Null` when the field is absent), the required flag, and the
    /// declared type. Afterwards every field present in the map must be
    /// declared in the schema.
    pub fn validate(&self, fields: &FieldMap) -> DocBindResult<()> {
        for (name, spec) in &self.fields {
            let value = fields.get(name);

            if let Some(validator) = &spec.validator {
                if !validator(value.unwrap_or(&Bson::Null)) {
                    return Err(DocBindError::Validation(format!("Field '{name}' is invalid")));
                }
            }

            match value {
                None | Some(Bson::Null) => {
                    if spec.required {
                        return Err(DocBindError::Validation(format!(
                            "Required field '{name}' is missing"
                        )));
                    }
                }
                Some(value) => {
                    if !spec.field_type.matches(value) {
                        return Err(DocBindError::Validation(format!(
                            "Field '{name}' has invalid type, expected {:?}",
                            spec.field_type
                        )));
                    }
                }
            }
        }

        for name in fields.keys() {
            if !self.fields.contains_key(name.as_str()) {
                return Err(DocBindError::FieldNotInSchema(name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn user_schema() -> Schema {
        Schema::new()
            .field("name", FieldSpec::required(FieldType::String))
            .field("age", FieldSpec::optional(FieldType::Int))
    }

    #[test]
    fn accepts_conforming_fields() {
        let fields = FieldMap::from(doc! { "name": "Alice", "age": 30 });
        assert!(user_schema().validate(&fields).is_ok());
    }

    #[test]
    fn optional_field_may_be_absent_or_null() {
        let absent = FieldMap::from(doc! { "name": "Alice" });
        let null = FieldMap::from(doc! { "name": "Alice", "age": Bson::Null });
        assert!(user_schema().validate(&absent).is_ok());
        assert!(user_schema().validate(&null).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let fields = FieldMap::from(doc! { "age": 30 });
        assert!(matches!(
            user_schema().validate(&fields),
            Err(DocBindError::Validation(_))
        ));
    }

    #[test]
    fn rejects_wrong_type() {
        let fields = FieldMap::from(doc! { "name": "Alice", "age": "thirty" });
        assert!(matches!(
            user_schema().validate(&fields),
            Err(DocBindError::Validation(_))
        ));
    }

    #[test]
    fn rejects_undeclared_field() {
        let fields = FieldMap::from(doc! { "name": "Alice", "nickname": "Al" });
        assert!(matches!(
            user_schema().validate(&fields),
            Err(DocBindError::FieldNotInSchema(name)) if name == "nickname"
        ));
    }

    #[test]
    fn runs_custom_validator() {
        let schema = Schema::new().field(
            "age",
            FieldSpec::required(FieldType::Int).with_validator(|v| v.as_i64().is_some_and(|age| age >= 0)),
        );

        assert!(schema.validate(&FieldMap::from(doc! { "age": 30_i64 })).is_ok());
        assert!(matches!(
            schema.validate(&FieldMap::from(doc! { "age": -1_i64 })),
            Err(DocBindError::Validation(_))
        ));
    }
}
