// lib.rs - Shared core for the Tender legal desk

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod cases;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod inbox;
pub mod intake;
pub mod model;
pub mod ocr_tool;
pub mod session;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::AppConfig;
pub use error::{ApiError, AppError, ErrorKind};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

pub use crux_core::{render::Render, App as CruxApp};

/// Storage key the auth token is persisted under.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// MIME type that routes an upload through OCR.
pub const PDF_MIME_TYPE: &str = "application/pdf";
