//! Account registration, login and refresh tokens.
//!
//! Passwords are hashed with argon2 before they reach the store and are only ever
//! compared through the hash. Refresh tokens are random, opaque and single use.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng as SaltRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use bson::Uuid;
use rand::{RngCore, rngs::OsRng};
use serde_json::Value;
use stockroom_core::{backend::StoreBackend, query::Filter, store::DocumentStore};
use tracing::debug;

use crate::{
    entities::{PublicUser, User},
    error::{ModelError, ModelResult},
    repository::Repository,
    validate::{self, MIN_LEN, field},
};

const TOKEN_BYTES: usize = 32;

const INVALID_CREDENTIALS: &str = "invalid username or password";

pub(crate) fn hash_password(password: &str) -> ModelResult<String> {
    let salt = SaltString::generate(&mut SaltRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ModelError::Internal(format!("password hashing failed: {err}")))
}

/// A stored hash that does not parse never verifies.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Authentication operations over the `users` collection.
#[derive(Debug)]
pub struct AuthService<'a, B: StoreBackend> {
    users: Repository<'a, B, User>,
}

impl<'a, B: StoreBackend> AuthService<'a, B> {
    pub fn new(store: &'a DocumentStore<B>) -> Self {
        Self { users: Repository::new(store) }
    }

    /// The underlying user repository.
    pub fn users(&self) -> &Repository<'a, B, User> {
        &self.users
    }

    /// Creates an account from `{username, email, password}`.
    pub async fn register(&self, payload: &Value) -> ModelResult<Uuid> {
        self.users.create(payload).await
    }

    /// Checks `{username, password}` and returns the account.
    ///
    /// An unknown username and a wrong password fail with the same message.
    pub async fn login(&self, payload: &Value) -> ModelResult<PublicUser> {
        let username = validate::required_string(field(payload, "username"), "username", MIN_LEN)?;
        let password = validate::password(field(payload, "password"))?;

        let user = self
            .users
            .find_one(Filter::eq("username", username))
            .await?
            .filter(|user| verify_password(&password, &user.password))
            .ok_or_else(|| ModelError::Auth(INVALID_CREDENTIALS.to_string()))?;

        debug!(id = %user.id, "login accepted");
        Ok(PublicUser::from(&user))
    }

    /// Generates a new refresh token, stores it on the account and returns it.
    ///
    /// Any token issued earlier stops working.
    pub async fn issue_and_store_refresh_token(&self, id: Uuid) -> ModelResult<String> {
        let mut user = self.users.get(id).await?;
        let token = generate_token();

        user.refresh_token = Some(token.clone());
        self.users.replace(user).await?;

        Ok(token)
    }

    /// Checks `token` against the stored refresh token and clears it.
    ///
    /// # Errors
    ///
    /// [`ModelError::Auth`] when no token is stored or the tokens differ.
    pub async fn consume_refresh_token(&self, id: Uuid, token: &Value) -> ModelResult<PublicUser> {
        let token = validate::token(token)?;
        let mut user = self.users.get(id).await?;

        match user.refresh_token.as_deref() {
            None => return Err(ModelError::Auth("missing refresh token".to_string())),
            Some(stored) if stored != token => {
                return Err(ModelError::Auth("refresh token mismatch".to_string()));
            }
            Some(_) => {}
        }

        // Cleared only if the token is still the one checked above, so a token
        // consumed concurrently is accepted once.
        user.refresh_token = None;
        let public = PublicUser::from(&user);
        let unchanged = Filter::eq("refresh_token", token);

        if !self.users.replace_if(user, &unchanged).await? {
            return Err(ModelError::Auth("missing refresh token".to_string()));
        }

        Ok(public)
    }

    /// Clears the stored refresh token, if any.
    pub async fn delete_refresh_token(&self, id: Uuid) -> ModelResult<()> {
        let mut user = self.users.get(id).await?;

        if user.refresh_token.take().is_some() {
            self.users.replace(user).await?;
        }

        Ok(())
    }

    /// Resolves `{id}` to the account it names.
    pub async fn check_session(&self, payload: &Value) -> ModelResult<PublicUser> {
        let id = validate::identifier(field(payload, "id"))?;

        self.users.get(id).await.map(|user| PublicUser::from(&user))
    }
}
