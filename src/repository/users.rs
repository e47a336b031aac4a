//! Users storage

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, Role, User, UserRow},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;

    async fn get_by_id(&self, id: i32) -> AppResult<User>;

    async fn get_by_api_key_digest(&self, digest: &str) -> AppResult<Option<User>>;

    /// Fails with a validation error when the email is already taken
    async fn create(&self, data: &NewUser) -> AppResult<User>;

    async fn count_with_role(&self, role: Role) -> AppResult<i64>;
}

const COLUMNS: &str = "id, email, first_name, last_name, role, api_key_digest, created_at";

#[derive(Clone)]
pub struct PgUsersRepository {
    pool: Pool<Postgres>,
}

impl PgUsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users ORDER BY id", COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?
            .try_into()
    }

    async fn get_by_api_key_digest(&self, digest: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE api_key_digest = $1", COLUMNS))
            .bind(digest)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, role, api_key_digest)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role.as_str())
        .bind(&data.api_key_digest)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.try_into(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Validation("email has already been taken".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count_with_role(&self, role: Role) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
