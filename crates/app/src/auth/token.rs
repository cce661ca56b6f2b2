//! Session token generation, parsing and hashing.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

/// Session token prefix.
pub const SESSION_TOKEN_PREFIX: &str = "soko";

/// Number of secret bytes encoded in a token.
pub const SESSION_TOKEN_SECRET_BYTES: usize = 32;

const SESSION_TOKEN_SECRET_HEX_CHARS: usize = SESSION_TOKEN_SECRET_BYTES * 2;

#[derive(Clone)]
pub struct SessionTokenSecret {
    bytes: [u8; SESSION_TOKEN_SECRET_BYTES],
}

impl SessionTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SESSION_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SESSION_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for SessionTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionTokenSecret(**redacted**)")
    }
}

impl Drop for SessionTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("session token format is invalid")]
    InvalidFormat,

    #[error("session token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_session_secret() -> SessionTokenSecret {
    let mut secret = [0_u8; SESSION_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    SessionTokenSecret::from_bytes(secret)
}

#[must_use]
pub fn format_session_token(secret: &SessionTokenSecret) -> String {
    format!(
        "{SESSION_TOKEN_PREFIX}_{}",
        hex::encode(secret.as_bytes())
    )
}

/// Check a presented bearer token is well formed before touching storage.
///
/// # Errors
///
/// - [`SessionTokenError::InvalidFormat`]: wrong prefix or separator.
/// - [`SessionTokenError::InvalidSecretEncoding`]: the secret is not 64 hex characters.
pub fn parse_session_token(token: &str) -> Result<SessionTokenSecret, SessionTokenError> {
    let (prefix, secret_hex) = token
        .split_once('_')
        .ok_or(SessionTokenError::InvalidFormat)?;

    if prefix != SESSION_TOKEN_PREFIX {
        return Err(SessionTokenError::InvalidFormat);
    }

    if secret_hex.len() != SESSION_TOKEN_SECRET_HEX_CHARS {
        return Err(SessionTokenError::InvalidSecretEncoding);
    }

    let mut secret = [0_u8; SESSION_TOKEN_SECRET_BYTES];

    hex::decode_to_slice(secret_hex, &mut secret)
        .map_err(|_decode| SessionTokenError::InvalidSecretEncoding)?;

    Ok(SessionTokenSecret::from_bytes(secret))
}

/// SHA-256 of the token, hex encoded. This is the only form that is persisted.
#[must_use]
pub fn hash_session_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
