//! API key authentication and user management service

use rand::RngCore;
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, NewUser, Principal, Role, User},
    repository::Repository,
};

/// Number of random bytes in a generated API key (hex-encoded on the wire)
const API_KEY_BYTES: usize = 32;

/// Generate a fresh random API key
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest under which an API key is stored
pub fn digest_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve an API key to a principal
    pub async fn authenticate(&self, api_key: &str) -> AppResult<Principal> {
        if api_key.is_empty() {
            return Err(AppError::Authentication("Missing API key".to_string()));
        }

        let user = self
            .repository
            .users
            .get_by_api_key_digest(&digest_api_key(api_key))
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid API key".to_string()))?;

        Ok(Principal::from(&user))
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a user with a freshly generated API key.
    /// Returns the user and the plain key, which is not kept anywhere.
    pub async fn create_user(&self, data: CreateUser) -> AppResult<(User, String)> {
        data.validate()?;
        let api_key = generate_api_key();
        let user = self.create_with_key(data, &api_key).await?;
        Ok((user, api_key))
    }

    async fn create_with_key(&self, data: CreateUser, api_key: &str) -> AppResult<User> {
        let email = non_blank(data.email)
            .ok_or_else(|| AppError::Validation("email can't be blank".to_string()))?
            .to_lowercase();

        let new_user = NewUser {
            email,
            first_name: non_blank(data.first_name),
            last_name: non_blank(data.last_name),
            role: data.role.unwrap_or(Role::User),
            api_key_digest: digest_api_key(api_key),
        };

        let user = self.repository.users.create(&new_user).await?;
        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Create an admin holding `api_key` unless an admin already exists.
    /// Returns the created admin, if any.
    pub async fn ensure_bootstrap_admin(&self, api_key: &str, email: &str) -> AppResult<Option<User>> {
        if self.repository.users.count_with_role(Role::Admin).await? > 0 {
            return Ok(None);
        }
        if api_key.trim().is_empty() {
            return Err(AppError::Validation("bootstrap admin key can't be blank".to_string()));
        }

        let admin = self
            .create_with_key(
                CreateUser {
                    email: Some(email.to_string()),
                    first_name: None,
                    last_name: None,
                    role: Some(Role::Admin),
                },
                api_key.trim(),
            )
            .await
            .map_err(|e| match e {
                AppError::Validation(msg) => AppError::Validation(format!(
                    "cannot create bootstrap admin '{}' (set auth.bootstrap_admin_email): {}",
                    email, msg
                )),
                other => other,
            })?;
        Ok(Some(admin))
    }
}
