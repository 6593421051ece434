//! Outbound calls to the auth/case backend, the OCR endpoint and the agent runtime.
//!
//! Each call is fired through the `Http` capability and its response is decoded
//! inside the callback, so events carry plain `Result`s.

pub mod agent;
pub mod auth;
pub mod cases;
pub mod email;
pub mod ocr;

use crux_http::RequestBuilder;
use serde::Serialize;

use crate::capabilities::{Capabilities, JSON_CONTENT_TYPE};
use crate::config::Endpoints;
use crate::error::ApiError;
use crate::event::Event;

pub struct Gateway<'a> {
    caps: &'a Capabilities,
    endpoints: &'a Endpoints,
    bearer: Option<String>,
}

impl<'a> Gateway<'a> {
    #[must_use]
    pub fn new(caps: &'a Capabilities, endpoints: &'a Endpoints, bearer: Option<String>) -> Self {
        Self {
            caps,
            endpoints,
            bearer,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder<Event> {
        self.authorize(self.caps.http.get(url))
    }

    fn post(&self, url: &str) -> RequestBuilder<Event> {
        self.authorize(self.caps.http.post(url))
    }

    fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<RequestBuilder<Event>, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::Parse(format!("failed to encode request: {e}")))?;
        Ok(self
            .post(url)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body_bytes(bytes))
    }

    fn authorize(&self, builder: RequestBuilder<Event>) -> RequestBuilder<Event> {
        match &self.bearer {
            Some(bearer) => builder.header("Authorization", bearer.as_str()),
            None => builder,
        }
    }
}
