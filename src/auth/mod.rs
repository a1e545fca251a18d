//! Credentials: password hashing, opaque token minting and the
//! `Authorization` header format.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::HeaderValue;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::database::DatabaseError;

/// Header keywords accepted in front of the token, compared case-insensitively
pub const TOKEN_KEYWORDS: [&str; 2] = ["Token", "Bearer"];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token keyword without credentials")]
    MissingCredentials,

    #[error("token string contains spaces")]
    MalformedHeader,

    #[error("authorization header is not valid ASCII")]
    InvalidCharacters,

    #[error("unknown token")]
    InvalidToken,

    #[error("user inactive or deleted")]
    InactiveUser,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Mint a new opaque token: 64 lowercase hex characters
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// SHA-256 of the token, hex encoded. Only this is ever stored.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string.
/// An unparseable hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Extract the token from an `Authorization` header.
///
/// `Ok(None)` means the request carries no token credentials at all (no
/// header, or a scheme we do not handle) and proceeds anonymously.
pub fn parse_authorization(header: Option<&HeaderValue>) -> Result<Option<String>, AuthError> {
    let Some(header) = header else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| AuthError::InvalidCharacters)?;
    let mut parts = value.split_whitespace();

    let Some(keyword) = parts.next() else {
        return Ok(None);
    };
    if !TOKEN_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
        return Ok(None);
    }

    let token = parts.next().ok_or(AuthError::MissingCredentials)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(Some(token.to_string()))
}
