//! Filter evaluation for the in-memory backend.
//!
//! The binding layer hands backends mongo-style filter documents: flat
//! equality constraints, optionally with operator sub-documents such as
//! `{ "$in": [...] }`. This module evaluates those filters against stored
//! records.

use std::cmp::Ordering;
use std::collections::HashMap;

use bson::{Bson, DateTime, Document, oid::ObjectId};

use docbind_core::error::{DocBindError, DocBindResult};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps BSON values for the comparisons filters need, normalizing all numeric
/// types to f64 so that integer width does not affect matching.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    ObjectId(&'a ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            // Other types do not take part in filter comparisons.
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates mongo-style filter documents against stored records.
pub(crate) struct FilterMatcher;

impl FilterMatcher {
    /// Returns `true` when `record` satisfies every constraint in `filter`.
    /// An empty filter matches everything.
    pub(crate) fn matches(filter: &Document, record: &Document) -> DocBindResult<bool> {
        for (field, condition) in filter {
            let value = record.get(field);

            match condition {
                Bson::Document(ops) if Self::is_operator_doc(ops) => {
                    for (op, operand) in ops {
                        if !Self::apply_operator(op, operand, value)? {
                            return Ok(false);
                        }
                    }
                }
                expected => {
                    // Plain equality; a missing field only matches null.
                    let actual = value.map(Comparable::from).unwrap_or(Comparable::Null);
                    if actual != Comparable::from(expected) {
                        return Ok(false);
                    }
                }
            }
        }

        Ok(true)
    }

    fn is_operator_doc(doc: &Document) -> bool {
        doc.keys().any(|key| key.starts_with('$'))
    }

    fn apply_operator(op: &str, operand: &Bson, value: Option<&Bson>) -> DocBindResult<bool> {
        if op == "$exists" {
            let should_exist = matches!(operand, Bson::Boolean(true));
            return Ok(value.is_some() == should_exist);
        }

        let actual = value.map(Comparable::from).unwrap_or(Comparable::Null);
        match op {
            "$eq" => Ok(actual == Comparable::from(operand)),
            "$ne" => Ok(actual != Comparable::from(operand)),
            "$gt" => Ok(actual.partial_cmp(&Comparable::from(operand)) == Some(Ordering::Greater)),
            "$gte" => Ok(matches!(
                actual.partial_cmp(&Comparable::from(operand)),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            "$lt" => Ok(actual.partial_cmp(&Comparable::from(operand)) == Some(Ordering::Less)),
            "$lte" => Ok(matches!(
                actual.partial_cmp(&Comparable::from(operand)),
                Some(Ordering::Less | Ordering::Equal)
            )),
            "$in" => match operand {
                Bson::Array(candidates) => Ok(candidates
                    .iter()
                    .any(|candidate| actual == Comparable::from(candidate))),
                _ => Err(DocBindError::Backend(
                    "$in operand must be an array".to_string(),
                )),
            },
            other => Err(DocBindError::Backend(format!(
                "unsupported filter operator: {other}"
            ))),
        }
    }
}
