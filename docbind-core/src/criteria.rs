//! Query criteria normalization for collection-level operations.
//!
//! Collection queries accept criteria in two shapes, mirroring the interface
//! this layer is compatible with:
//!
//! - a flat mapping of field names to values, treated as equality constraints
//!   combined implicitly with AND;
//! - a single-entry mapping whose sole value is itself a mapping, in which case
//!   the nested mapping is passed through verbatim as the raw store filter
//!   (the escape hatch for operator queries like `{ "age": { "$gt": 30 } }`).
//!
//! [`Criteria`] captures that normalization once so every query path shares it.

use bson::{Bson, Document};

/// A normalized store filter.
///
/// # Example
///
/// ```ignore
/// use docbind::criteria::Criteria;
/// use bson::doc;
///
/// // Flat equality constraints, ANDed together.
/// let by_fields = Criteria::from(doc! { "name": "Alice", "age": 30 });
///
/// // Single nested mapping: the inner document becomes the raw filter.
/// let raw = Criteria::from(doc! { "query": { "age": { "$gt": 30 } } });
/// assert_eq!(raw.as_filter(), &doc! { "age": { "$gt": 30 } });
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria(Document);

impl Criteria {
    /// Criteria matching every record in the collection.
    pub fn all() -> Self {
        Self(Document::new())
    }

    /// Set-membership criteria: matches records whose `field` value is a
    /// member of `values`.
    pub fn field_in(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        let mut filter = Document::new();
        filter.insert(field.into(), bson::doc! { "$in": values });
        Self(filter)
    }

    /// Borrows the normalized filter document.
    pub fn as_filter(&self) -> &Document {
        &self.0
    }

    /// Consumes the criteria and returns the filter document.
    pub fn into_filter(self) -> Document {
        self.0
    }
}

impl From<Document> for Criteria {
    fn from(criteria: Document) -> Self {
        // A single entry whose value is a nested mapping is passed through as
        // the raw filter; anything else already is a set of equality
        // constraints.
        if criteria.len() == 1 {
            if let Some((_, Bson::Document(inner))) = criteria.iter().next() {
                return Self(inner.clone());
            }
        }
        Self(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn flat_constraints_pass_as_equality_and() {
        let criteria = Criteria::from(doc! { "name": "Alice", "age": 30 });
        assert_eq!(criteria.as_filter(), &doc! { "name": "Alice", "age": 30 });
    }

    #[test]
    fn single_nested_mapping_passes_through() {
        let criteria = Criteria::from(doc! { "query": { "age": { "$gt": 30 } } });
        assert_eq!(criteria.as_filter(), &doc! { "age": { "$gt": 30 } });
    }

    #[test]
    fn single_scalar_entry_stays_an_equality_constraint() {
        let criteria = Criteria::from(doc! { "name": "Alice" });
        assert_eq!(criteria.as_filter(), &doc! { "name": "Alice" });
    }

    #[test]
    fn field_in_builds_membership_filter() {
        let criteria = Criteria::field_in("status", ["a", "b"]);
        assert_eq!(criteria.as_filter(), &doc! { "status": { "$in": ["a", "b"] } });
    }

    #[test]
    fn all_matches_everything() {
        assert!(Criteria::all().as_filter().is_empty());
    }
}
