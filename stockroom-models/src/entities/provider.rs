use bson::Uuid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockroom_core::document::Document;

use crate::{
    error::ModelResult,
    repository::Entity,
    validate::{self, MIN_LEN, field},
};

/// A supplier of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Document for Provider {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "providers"
    }
}

impl Entity for Provider {
    const KIND: &'static str = "Provider";
    const UNIQUE_FIELD: &'static str = "name";

    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self> {
        Ok(Self {
            id,
            name: validate::required_string(field(payload, "name"), "name", MIN_LEN)?,
            email: validate::email(field(payload, "email"))?,
            phone: validate::required_string(field(payload, "phone"), "phone", MIN_LEN)?,
            address: validate::required_string(field(payload, "address"), "address", MIN_LEN)?,
        })
    }
}
