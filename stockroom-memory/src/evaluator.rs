//! Filter evaluation for in-memory scans.
//!
//! Values are compared through [`Comparable`], which folds every BSON number into `f64`
//! so that a filter built from a JSON number matches a stored integer or double alike.

use bson::{Binary, Bson, Document as BsonDocument, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

use stockroom_core::{
    error::DocumentStoreError,
    query::{Expr, FieldOp, Predicate, QueryVisitor},
};

#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    /// All integers and floats normalized to f64
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    /// Compared by subtype and bytes; UUID ids land here
    Binary(&'a Binary),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON type, equal only to an identical value
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(f64::from(*value)),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(items) => Comparable::Array(items.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            Bson::Binary(value) => Comparable::Binary(value),
            Bson::Null | Bson::Undefined => Comparable::Null,
            other => Comparable::Other(other),
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Binary(a), Comparable::Binary(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a dotted path against a document.
///
/// Each segment descends into embedded documents; an embedded array fans out over
/// its document elements. An undotted path is a plain top-level lookup.
pub(crate) fn resolve_path<'d>(document: &'d BsonDocument, path: &str) -> Vec<&'d Bson> {
    let mut segments = path.split('.');
    let mut current: Vec<&Bson> = match segments.next() {
        Some(first) => document.get(first).into_iter().collect(),
        None => return Vec::new(),
    };

    for segment in segments {
        current = current
            .into_iter()
            .flat_map(|value| match value {
                Bson::Document(doc) => doc.get(segment).into_iter().collect::<Vec<_>>(),
                Bson::Array(items) => items
                    .iter()
                    .filter_map(Bson::as_document)
                    .filter_map(|doc| doc.get(segment))
                    .collect(),
                _ => Vec::new(),
            })
            .collect();
    }

    current
}

fn compare(field_value: &Bson, op: &FieldOp, value: &Bson) -> bool {
    let left = Comparable::from(field_value);
    let right = Comparable::from(value);

    match op {
        FieldOp::Eq => left == right,
        FieldOp::Ne => left != right,
        FieldOp::Gt => left.partial_cmp(&right) == Some(Ordering::Greater),
        FieldOp::Lt => left.partial_cmp(&right) == Some(Ordering::Less),
        FieldOp::Contains => match (left, right) {
            (Comparable::Array(items), needle) => items.iter().any(|item| item == &needle),
            (Comparable::String(haystack), Comparable::String(needle)) => haystack.contains(needle),
            _ => false,
        },
    }
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a BsonDocument,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a BsonDocument) -> Self {
        Self { document }
    }

    pub fn matches(document: &'a BsonDocument, expr: &Expr) -> bool {
        // Evaluation itself never fails; the Result only satisfies the visitor contract.
        DocumentEvaluator::new(document)
            .visit_expr(expr)
            .unwrap_or(false)
    }
}

impl QueryVisitor for DocumentEvaluator<'_> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<bool, DocumentStoreError> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<bool, DocumentStoreError> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<bool, DocumentStoreError> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<bool, DocumentStoreError> {
        let values = resolve_path(self.document, field);

        if values.is_empty() {
            return Ok(false);
        }

        Ok(if op.is_negative() {
            values.iter().all(|v| compare(v, op, value))
        } else {
            values.iter().any(|v| compare(v, op, value))
        })
    }

    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<bool, DocumentStoreError> {
        Ok(predicate.test(self.document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Uuid, doc};
    use stockroom_core::query::Filter;

    fn sell() -> BsonDocument {
        doc! {
            "code": "S-0001",
            "total": 30.0,
            "status": "pending",
            "products": [
                { "product_id": "p-1", "quantity": 2.0 },
                { "product_id": "p-2", "quantity": 1.0 },
            ],
        }
    }

    #[test]
    fn numbers_compare_across_representations() {
        let doc = doc! { "stock": 5_i32 };
        assert!(DocumentEvaluator::matches(&doc, &Filter::eq("stock", 5.0)));
        assert!(DocumentEvaluator::matches(&doc, &Filter::gt("stock", 4_i64)));
        assert!(!DocumentEvaluator::matches(&doc, &Filter::lt("stock", 5.0)));
    }

    #[test]
    fn dotted_path_fans_out_over_arrays() {
        let doc = sell();
        assert!(DocumentEvaluator::matches(&doc, &Filter::eq("products.product_id", "p-2")));
        assert!(!DocumentEvaluator::matches(&doc, &Filter::eq("products.product_id", "p-3")));
        assert_eq!(resolve_path(&doc, "products.quantity").len(), 2);
    }

    #[test]
    fn negative_ops_must_hold_for_every_resolved_value() {
        let doc = sell();
        assert!(!DocumentEvaluator::matches(&doc, &Filter::ne("products.product_id", "p-1")));
        assert!(DocumentEvaluator::matches(&doc, &Filter::ne("products.product_id", "p-9")));
    }

    #[test]
    fn missing_field_never_matches() {
        let doc = sell();
        assert!(!DocumentEvaluator::matches(&doc, &Filter::eq("seller_id", "x")));
        assert!(!DocumentEvaluator::matches(&doc, &Filter::ne("seller_id", "x")));
    }

    #[test]
    fn uuid_ids_compare_by_bytes() {
        let (mine, other) = (Uuid::new(), Uuid::new());
        let doc = doc! { "id": mine, "name": "Acme" };

        assert!(DocumentEvaluator::matches(&doc, &Filter::eq("id", mine)));
        assert!(!DocumentEvaluator::matches(&doc, &Filter::eq("id", other)));
        assert!(DocumentEvaluator::matches(&doc, &Filter::ne("id", other)));
        assert!(!DocumentEvaluator::matches(&doc, &Filter::ne("id", mine)));
    }

    #[test]
    fn logical_and_predicate_exprs() {
        let doc = sell();
        let expr = Filter::or([Filter::eq("status", "paid"), Filter::contains("code", "0001")])
            .and(Filter::predicate(|d| d.get_array("products").map(|a| a.len() == 2).unwrap_or(false)));

        assert!(DocumentEvaluator::matches(&doc, &expr));
        assert!(!DocumentEvaluator::matches(&doc, &expr.not()));
    }
}
