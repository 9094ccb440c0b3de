use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Token lifetime out of range")]
    Lifetime,
}

/// JWT claims shared with the token issuer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub uid: i32,    // User ID
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize, // Expiration timestamp
}

/// Sign a token the way the issuer does. Used by tooling and tests.
pub fn sign(
    user_id: i32,
    username: &str,
    role: &str,
    permissions: Vec<String>,
    secret: &str,
) -> Result<String, TokenError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .ok_or(TokenError::Lifetime)?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        permissions,
        exp: usize::try_from(expiration).map_err(|_| TokenError::Lifetime)?,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verify and decode a token.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e),
    })?;
    Ok(token_data.claims)
}
