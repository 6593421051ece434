use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TOKEN_LENGTH: usize = 8192;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("stored token is not valid UTF-8")]
    InvalidEncoding,

    #[error("stored token is empty")]
    EmptyToken,

    #[error("stored token is too large: {size} bytes exceeds maximum of {max} bytes")]
    TokenTooLarge { size: usize, max: usize },
}

#[must_use]
pub fn encode_token(token: &SecretString) -> Vec<u8> {
    token.expose_secret().as_bytes().to_vec()
}

pub fn decode_token(bytes: Vec<u8>) -> Result<SecretString, KvError> {
    if bytes.len() > MAX_TOKEN_LENGTH {
        return Err(KvError::TokenTooLarge {
            size: bytes.len(),
            max: MAX_TOKEN_LENGTH,
        });
    }
    let token = String::from_utf8(bytes).map_err(|_| KvError::InvalidEncoding)?;
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(KvError::EmptyToken);
    }
    Ok(SecretString::new(trimmed.to_string()))
}
