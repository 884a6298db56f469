use bson::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockroom_core::{backend::StoreBackend, document::Document, query::Filter};

use crate::{
    error::{ModelError, ModelResult},
    repository::{Entity, Repository},
    validate::{self, MIN_LEN, Shape, field},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellStatus {
    Pending,
    Completed,
    Cancelled,
}

impl SellStatus {
    pub const OPTIONS: [(&'static str, SellStatus); 3] = [
        ("pending", SellStatus::Pending),
        ("completed", SellStatus::Completed),
        ("cancelled", SellStatus::Cancelled),
    ];
}

/// One product entry of a sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

const LINE_ITEM_SHAPE: [(&str, Shape); 4] = [
    ("product_id", Shape::String),
    ("name", Shape::String),
    ("quantity", Shape::Number),
    ("price", Shape::Number),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sell {
    pub id: Uuid,
    pub code: String,
    pub seller_id: String,
    pub date: DateTime<Utc>,
    pub status: SellStatus,
    pub total: f64,
    pub products: Vec<LineItem>,
}

impl Document for Sell {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "sells"
    }
}

impl Entity for Sell {
    const KIND: &'static str = "Sell";
    const UNIQUE_FIELD: &'static str = "code";

    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self> {
        let code = validate::required_string(field(payload, "code"), "code", MIN_LEN)?;
        let seller_id =
            validate::required_string(field(payload, "seller_id"), "seller_id", MIN_LEN)?;
        let date = validate::date_like(field(payload, "date"), "date")?;
        let status = validate::one_of(field(payload, "status"), "status", &SellStatus::OPTIONS)?;
        let total = validate::positive_number(field(payload, "total"), "total")?;
        let products =
            validate::record_array(field(payload, "products"), "products", &LINE_ITEM_SHAPE)?
                .into_iter()
                .map(|item| {
                    serde_json::from_value::<LineItem>(Value::Object(item))
                        .map_err(|err| ModelError::Internal(err.to_string()))
                })
                .collect::<ModelResult<_>>()?;

        Ok(Self { id, code, seller_id, date, status, total, products })
    }
}

impl<B: StoreBackend> Repository<'_, B, Sell> {
    /// Returns every sell with a line item for the given product.
    pub async fn get_by_product(&self, product_id: &Value) -> ModelResult<Vec<Sell>> {
        let product_id = validate::required_string(product_id, "product_id", MIN_LEN)?;

        self.find(Filter::eq("products.product_id", product_id)).await
    }
}
