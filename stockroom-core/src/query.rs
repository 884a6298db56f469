//! Query construction and filtering API for document stores.
//!
//! A [`Query`] is a predicate over stored documents plus an optional result cap.
//! Backends answer it with a linear scan in insertion order, keeping every document
//! the predicate accepts until the cap is reached.
//!
//! ```ignore
//! use stockroom_core::query::{Query, Filter};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("provider_id", "acme").and(Filter::gt("stock", 0.0)))
//!     .limit(100)
//!     .build();
//! ```
//!
//! Field names may be dotted paths. A path walks through embedded documents and fans
//! out over embedded arrays, so `Filter::eq("products.product_id", id)` matches every
//! document holding at least one line item for `id`.

use bson::{Bson, Document as BsonDocument};
use std::{fmt, sync::Arc};

use crate::error::DocumentStoreError;

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// String contains a substring, or array contains an element.
    Contains,
}

impl FieldOp {
    /// Negative operators must hold for every value a path resolves to,
    /// positive ones for at least one.
    pub fn is_negative(&self) -> bool {
        matches!(self, FieldOp::Ne)
    }
}

/// An arbitrary predicate over a stored document.
///
/// Used where a kind needs a lookup the declarative filters cannot express.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&BsonDocument) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&BsonDocument) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn test(&self, document: &BsonDocument) -> bool {
        (self.0)(document)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A filter expression for querying documents.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Field comparison expression.
    Field {
        /// The field name or dotted path to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Caller supplied predicate.
    Predicate(Predicate),
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// A structured query for retrieving and filtering documents.
///
/// An empty query matches every document in the collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Maximum number of documents to return. The scan stops once it is reached.
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a new empty query with no filter or limit.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a query with the given filter and no limit.
    pub fn filtered(filter: Expr) -> Self {
        Query { filter: Some(filter), limit: None }
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Helper for constructing filter expressions.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where the field does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Matches documents where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Matches documents where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Matches documents where the string or array field contains the value.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    /// Matches documents accepted by an arbitrary predicate.
    pub fn predicate(f: impl Fn(&BsonDocument) -> bool + Send + Sync + 'static) -> Expr {
        Expr::Predicate(Predicate::new(f))
    }

    /// Combines expressions such that all must match.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Combines expressions such that any can match.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
            Expr::Predicate(predicate) => self.visit_predicate(predicate),
        }
    }
}
