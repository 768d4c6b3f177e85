use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::account::Account;
use jsonwebtoken::{encode, EncodingKey, Header};

const TOKEN_TTL_SECS: u64 = 60 * 60 * 24;

pub fn issue_token(account: &Account, secret: &str) -> Result<String> {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| Error::Internal(e.to_string()))?
        .as_secs()
        + TOKEN_TTL_SECS;

    let claims = Claims {
        sub: account.id.to_string(),
        exp: exp as usize,
        role: Some(account.role.clone()),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
}
