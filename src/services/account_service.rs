use crate::dto::auth_dto::{LoginPayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::account::Account;
use crate::utils::crypto::{hash_password, verify_password};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<Account> {
        let existing: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE username = $1 AND role = $2")
                .bind(&payload.username)
                .bind(&payload.role)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(Error::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (username, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING id, username, password_hash, role, created_at",
        )
        .bind(&payload.username)
        .bind(&password_hash)
        .bind(&payload.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<Account> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, password_hash, role, created_at
             FROM accounts
             WHERE username = $1 AND role = $2",
        )
        .bind(&payload.username)
        .bind(&payload.role)
        .fetch_optional(&self.pool)
        .await?;

        let Some(account) = account else {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        };

        let ok = verify_password(&payload.password, &account.password_hash)
            .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
        if !ok {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }

        Ok(account)
    }
}
