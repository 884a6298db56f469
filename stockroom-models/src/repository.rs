//! Validated CRUD over a single entity kind.
//!
//! A [`Repository`] pairs the validation rules of an [`Entity`] with its typed
//! collection. Every entry point validates the whole payload before it touches the
//! store, so a rejected call leaves the store untouched.

use bson::Uuid;
use serde_json::Value;
use stockroom_core::{
    backend::StoreBackend,
    collection::TypedCollection,
    document::Document,
    error::DocumentStoreError,
    query::{Expr, Filter, Query},
    store::DocumentStore,
};
use tracing::{debug, trace};

use crate::{
    error::{ModelError, ModelResult},
    validate::{self, FieldType},
};

/// Upper bound on the records returned by [`Repository::get_all`].
pub const MAX_RESULTS: usize = 100;

/// A document kind that can be built from an untrusted payload.
pub trait Entity: Document {
    /// Name used in failure messages, e.g. `"Provider"`.
    const KIND: &'static str;

    /// The field no two live records may share.
    const UNIQUE_FIELD: &'static str;

    /// Validates every field of `payload` and assembles a record with the given id.
    ///
    /// Fails on the first rule that does not hold.
    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self>;

    /// Copies state that is not part of the payload from the record being replaced.
    fn carry_over(&mut self, _previous: &Self) {}
}

#[derive(Debug)]
pub struct Repository<'a, B: StoreBackend, E: Entity> {
    collection: TypedCollection<'a, B, E>,
}

impl<'a, B: StoreBackend, E: Entity> Repository<'a, B, E> {
    pub fn new(store: &'a DocumentStore<B>) -> Self {
        Self { collection: store.typed_collection::<E>() }
    }

    /// Validates `payload`, assigns a fresh id and inserts the record.
    ///
    /// The uniqueness check and the insert happen as one store operation, so two
    /// concurrent creates with the same key cannot both succeed.
    ///
    /// # Errors
    ///
    /// [`ModelError::Validation`] for the first failing field, [`ModelError::Duplicate`]
    /// when the unique key is taken.
    pub async fn create(&self, payload: &Value) -> ModelResult<Uuid> {
        let record = E::from_payload(Uuid::new(), payload)?;
        let id = *record.id();

        self.collection
            .insert_unique(record, E::UNIQUE_FIELD)
            .await
            .map_err(store_error::<E>)?;

        debug!(kind = E::KIND, %id, "record created");
        Ok(id)
    }

    /// Returns up to [`MAX_RESULTS`] records in insertion order.
    pub async fn get_all(&self) -> ModelResult<Vec<E>> {
        trace!(kind = E::KIND, "listing records");

        Ok(self
            .collection
            .query(Query::builder().limit(MAX_RESULTS).build())
            .await?)
    }

    /// Returns the record with the given id.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotFound`] when no live record has that id.
    pub async fn get(&self, id: Uuid) -> ModelResult<E> {
        self.collection
            .get_one(id)
            .await?
            .ok_or_else(|| not_found::<E>(id))
    }

    /// Returns every record whose `field` equals `value`.
    ///
    /// `ty` declares how `value` is validated: `"string"` or `"number"`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnsupportedType`] for any other declared type, and
    /// [`ModelError::Validation`] when `value` fails the rule for its type.
    pub async fn get_by_field(&self, field: &str, value: &Value, ty: &str) -> ModelResult<Vec<E>> {
        let ty = FieldType::from_tag(ty).ok_or_else(|| ModelError::UnsupportedType {
            field: field.to_string(),
            ty: ty.to_string(),
        })?;
        let value = ty.validate(value, field)?;

        trace!(kind = E::KIND, field, "scanning by field");
        self.find(Filter::eq(field, value)).await
    }

    /// Returns every record matching `filter`.
    pub async fn find(&self, filter: Expr) -> ModelResult<Vec<E>> {
        Ok(self.collection.query(Query::filtered(filter)).await?)
    }

    /// Returns the first record matching `filter`.
    pub async fn find_one(&self, filter: Expr) -> ModelResult<Option<E>> {
        Ok(self.collection.find_one(filter).await?)
    }

    /// Replaces every field of the record named by `payload.id`.
    ///
    /// The payload is validated in full before the lookup; omitted fields fail exactly
    /// as they would on create. The unique key may stay as it is but cannot move onto a
    /// value another record holds.
    ///
    /// # Errors
    ///
    /// [`ModelError::Validation`], [`ModelError::NotFound`] or [`ModelError::Duplicate`];
    /// none of them writes anything.
    pub async fn edit(&self, payload: &Value) -> ModelResult<()> {
        let id = validate::identifier(validate::field(payload, "id"))?;
        let mut record = E::from_payload(id, payload)?;

        let previous = self.get(id).await?;
        record.carry_over(&previous);

        self.collection
            .update_unique(record, E::UNIQUE_FIELD)
            .await
            .map_err(store_error::<E>)?;

        debug!(kind = E::KIND, %id, "record edited");
        Ok(())
    }

    /// Removes the record named by `payload.id`.
    ///
    /// # Errors
    ///
    /// [`ModelError::Validation`] for a bad id, [`ModelError::NotFound`] when absent.
    pub async fn delete(&self, payload: &Value) -> ModelResult<()> {
        let id = validate::identifier(validate::field(payload, "id"))?;

        self.collection
            .delete(vec![id])
            .await
            .map_err(store_error::<E>)?;

        debug!(kind = E::KIND, %id, "record deleted");
        Ok(())
    }

    /// Writes back a record that was read and modified by the caller.
    pub(crate) async fn replace(&self, record: E) -> ModelResult<()> {
        let id = *record.id();

        self.collection
            .update(vec![record])
            .await
            .map_err(store_error::<E>)?;

        debug!(kind = E::KIND, %id, "record updated");
        Ok(())
    }

    /// Writes back a record only if the stored version still matches `condition`.
    pub(crate) async fn replace_if(&self, record: E, condition: &Expr) -> ModelResult<bool> {
        let id = *record.id();

        let replaced = self
            .collection
            .update_if(record, condition)
            .await
            .map_err(store_error::<E>)?;

        if replaced {
            debug!(kind = E::KIND, %id, "record updated");
        }

        Ok(replaced)
    }
}

fn not_found<E: Entity>(id: Uuid) -> ModelError {
    ModelError::NotFound { kind: E::KIND, id: id.to_string() }
}

fn store_error<E: Entity>(err: DocumentStoreError) -> ModelError {
    match err {
        DocumentStoreError::UniqueViolation(_, value, _) => ModelError::Duplicate {
            kind: E::KIND,
            field: E::UNIQUE_FIELD,
            value,
        },
        DocumentStoreError::DocumentNotFound(id, _) => ModelError::NotFound { kind: E::KIND, id },
        other => ModelError::Store(other),
    }
}
