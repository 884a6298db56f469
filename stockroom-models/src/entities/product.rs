use bson::Uuid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockroom_core::document::Document;

use crate::{
    error::{ModelError, ModelResult},
    repository::Entity,
    validate::{self, MIN_LEN, field},
};

/// A variant summary embedded in its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantLine {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub barcode: String,
    pub price: f64,
    pub stock: f64,
    pub images: Vec<String>,
    pub provider_id: String,
    pub variants: Vec<VariantLine>,
}

impl Document for Product {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "products"
    }
}

impl Entity for Product {
    const KIND: &'static str = "Product";
    const UNIQUE_FIELD: &'static str = "name";

    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self> {
        let name = validate::required_string(field(payload, "name"), "name", MIN_LEN)?;
        let description =
            validate::required_string(field(payload, "description"), "description", MIN_LEN)?;
        let sku = validate::sku(field(payload, "sku"))?;
        let barcode = validate::barcode(field(payload, "barcode"))?;
        let price = validate::positive_number(field(payload, "price"), "price")?;
        let stock = validate::positive_number(field(payload, "stock"), "stock")?;
        let images = validate::image_url_array(field(payload, "images"), "images")?;
        let provider_id =
            validate::required_string(field(payload, "provider_id"), "provider_id", MIN_LEN)?;
        let variants = validate::variant_array(field(payload, "variants"))?
            .into_iter()
            .map(|line| {
                serde_json::from_value::<VariantLine>(Value::Object(line))
                    .map_err(|err| ModelError::Internal(err.to_string()))
            })
            .collect::<ModelResult<_>>()?;

        Ok(Self {
            id,
            name,
            description,
            sku,
            barcode,
            price,
            stock,
            images,
            provider_id,
            variants,
        })
    }
}
