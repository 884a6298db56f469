use bson::Uuid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockroom_core::{backend::StoreBackend, document::Document, query::Filter};

use crate::{
    error::ModelResult,
    repository::{Entity, Repository},
    validate::{self, MIN_LEN, field},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Uuid,
    pub name: String,
    pub product_id: String,
    pub sku: String,
    pub price: f64,
    pub stock: f64,
    pub image: String,
}

impl Document for ProductVariant {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "product_variants"
    }
}

impl Entity for ProductVariant {
    const KIND: &'static str = "ProductVariant";
    const UNIQUE_FIELD: &'static str = "name";

    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self> {
        Ok(Self {
            id,
            name: validate::required_string(field(payload, "name"), "name", MIN_LEN)?,
            product_id: validate::required_string(
                field(payload, "product_id"),
                "product_id",
                MIN_LEN,
            )?,
            sku: validate::sku(field(payload, "sku"))?,
            price: validate::positive_number(field(payload, "price"), "price")?,
            stock: validate::positive_number(field(payload, "stock"), "stock")?,
            image: validate::image_url(field(payload, "image"), "image")?,
        })
    }
}

impl<B: StoreBackend> Repository<'_, B, ProductVariant> {
    /// Returns every variant of the given product.
    pub async fn get_by_product(&self, product_id: &Value) -> ModelResult<Vec<ProductVariant>> {
        let product_id = validate::required_string(product_id, "product_id", MIN_LEN)?;

        self.find(Filter::eq("product_id", product_id)).await
    }
}
