use bson::Uuid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockroom_core::document::Document;

use crate::{
    auth::hash_password,
    error::ModelResult,
    repository::Entity,
    validate::{self, MIN_LEN, field},
};

/// An account able to log in.
///
/// Only the argon2 hash of the password is kept. Use [`PublicUser`] for anything that
/// leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Document for User {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "users"
    }
}

impl Entity for User {
    const KIND: &'static str = "User";
    const UNIQUE_FIELD: &'static str = "username";

    fn from_payload(id: Uuid, payload: &Value) -> ModelResult<Self> {
        let username = validate::required_string(field(payload, "username"), "username", MIN_LEN)?;
        let email = validate::email(field(payload, "email"))?;
        let password = validate::password(field(payload, "password"))?;

        Ok(Self {
            id,
            username,
            email,
            password: hash_password(&password)?,
            refresh_token: None,
        })
    }

    fn carry_over(&mut self, previous: &Self) {
        self.refresh_token = previous.refresh_token.clone();
    }
}

/// The fields of a [`User`] that are safe to hand out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
