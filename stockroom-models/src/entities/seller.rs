use bson::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockroom_core::document::Document;

use crate::{
    error::ModelResult,
    repository::Entity,
    validate::{self, MIN_LEN, field},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
}

impl Role {
    pub const OPTIONS: [(&'static str, Role); 2] = [("admin", Role::Admin), ("seller", Role::Seller)];
}

/// A member of staff who can record sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub rol: Role,
    pub start_date: DateTime<Utc>,
}

impl Document for Seller {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "sellers"
    }
}

impl Entity for Seller {
    const KIND: &'static str = "Seller";
    const UNIQUE_FIELD: &'static str = "username";

    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self> {
        Ok(Self {
            id,
            username: validate::required_string(field(payload, "username"), "username", MIN_LEN)?,
            name: validate::required_string(field(payload, "name"), "name", MIN_LEN)?,
            email: validate::email(field(payload, "email"))?,
            rol: validate::one_of(field(payload, "rol"), "rol", &Role::OPTIONS)?,
            start_date: validate::date_like(field(payload, "start_date"), "start_date")?,
        })
    }
}
