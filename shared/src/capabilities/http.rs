use crux_http::Response;
use serde::de::DeserializeOwned;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MAX_RESPONSE_BODY_SIZE: usize = 100 * 1024 * 1024;

/// What every request hands back before it becomes an `Event`.
pub type HttpResult = crux_http::Result<Response<Vec<u8>>>;

#[must_use]
pub fn bearer_header(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

/// Body of a 2xx response. Anything else is an error.
pub fn read_body(result: HttpResult) -> Result<Vec<u8>, ApiError> {
    let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status as u16,
        });
    }

    let body = response.take_body().unwrap_or_default();
    if body.len() > MAX_RESPONSE_BODY_SIZE {
        return Err(ApiError::Parse(format!(
            "response body of {} bytes exceeds maximum of {MAX_RESPONSE_BODY_SIZE} bytes",
            body.len()
        )));
    }
    Ok(body)
}

pub fn read_json<T: DeserializeOwned>(result: HttpResult) -> Result<T, ApiError> {
    let body = read_body(result)?;
    parse_json(&body)
}

pub fn read_ok(result: HttpResult) -> Result<(), ApiError> {
    read_body(result).map(|_| ())
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Parse("empty response body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Parse(format!("failed to parse JSON: {e}")))
}
