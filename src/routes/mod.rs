pub mod auth;
pub mod health;
pub mod posting;
pub mod profile;
pub mod public;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use uuid::Uuid;

pub(crate) fn account_id(claims: &Claims) -> Result<Uuid> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| Error::Unauthorized("Invalid token subject".to_string()))
}
