//! Capabilities the core asks the shell to perform, plus the helpers that
//! decode HTTP responses and encode the stored auth token.

mod http;
mod kv;

pub use self::http::{
    bearer_header, read_body, read_json, read_ok, HttpResult, JSON_CONTENT_TYPE,
    MAX_RESPONSE_BODY_SIZE,
};
pub use self::kv::{decode_token, encode_token, KvError, MAX_TOKEN_LENGTH};

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

// The Effect derive refers to the app type by name.
#[allow(unused_imports)]
use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub render: Render<Event>,
}
