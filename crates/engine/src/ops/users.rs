use argon2::{
    Algorithm, Argon2, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Session, User, users, util::Validator};

use super::{Engine, new_id};

const MAX_USERNAME_CHARS: usize = 32;
const MAX_PASSWORD_CHARS: usize = 255;
const INVALID_LOGIN: &str = "Invalid username or password";

fn validate_credentials(username: &str, password: &str) -> ResultEngine<()> {
    let mut validator = Validator::new();
    if validator.required_text("Username", username) {
        validator.max_chars("Username", Some(username), MAX_USERNAME_CHARS);
    }
    if validator.required_text("Password", password) {
        validator.max_chars("Password", Some(password), MAX_PASSWORD_CHARS);
    }
    validator.finish()
}

impl Engine {
    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            self.password_params.clone(),
        )
    }

    /// Creates a user. Usernames are unique.
    pub async fn register(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = username.trim();
        validate_credentials(username, password)?;

        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .is_some();
        if taken {
            return Err(EngineError::Invalid("Username is taken.".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .hasher()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| EngineError::Hashing(err.to_string()))?
            .to_string();

        let model = users::ActiveModel {
            id: ActiveValue::Set(new_id()),
            username: ActiveValue::Set(username.to_string()),
            password_hash: ActiveValue::Set(password_hash),
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(user = %model.id, "registered user");
        Ok(User::from(model))
    }

    /// Checks the credentials and opens a session.
    pub async fn login(&self, username: &str, password: &str) -> ResultEngine<(User, Session)> {
        let username = username.trim();
        validate_credentials(username, password)?;

        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::Unauthorized(INVALID_LOGIN.to_string()))?;

        let parsed = PasswordHash::new(&model.password_hash)
            .map_err(|err| EngineError::Hashing(err.to_string()))?;
        if self
            .hasher()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(EngineError::Unauthorized(INVALID_LOGIN.to_string()));
        }

        let session = self.sessions.create(model.id).await?;
        Ok((User::from(model), session))
    }

    pub async fn logout(&self, session_id: &str) {
        self.sessions.delete(session_id).await;
    }

    /// Resolves a session id to its user.
    pub async fn user_for_session(&self, session_id: &str) -> ResultEngine<User> {
        let session = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| EngineError::Unauthorized("unauthorized".to_string()))?;
        self.user(session.user_id).await
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::Unauthorized("unauthorized".to_string()))
    }
}
