//! # jsonlog-extras
//!
//! Integrations for `jsonlog-core`, opt-in via Cargo feature flags.
//!
//! ## Features
//!
//! - `http` - `http::Request` attribute adapter, request encoder and the
//!   [`RequestLogger`]
//! - `tracing-layer` - [`JsonLogLayer`], a `tracing-subscriber` layer writing
//!   one filtered JSON document per event
//! - `config` - configuration from environment variables and `.env` files
//! - `full` - All features enabled
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! jsonlog-extras = { version = "0.1", features = ["http", "tracing-layer"] }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

// http::Request adapter
#[cfg(feature = "http")]
pub mod http;

// Request logging facade
#[cfg(feature = "http")]
pub mod request_logger;

// tracing-subscriber layer
#[cfg(feature = "tracing-layer")]
pub mod layer;

// Environment configuration
#[cfg(feature = "config")]
pub mod env;

pub use error::{Error, Result};

/// Target of request documents already formatted by a [`RequestLogger`]
pub const REQUEST_TARGET: &str = "jsonlog::request";

#[cfg(feature = "http")]
pub use http::{
    default_redactions, flatten_request, HttpRequestEncoder, HttpRequestSource, REDACTED,
};

#[cfg(feature = "http")]
pub use request_logger::RequestLogger;

#[cfg(feature = "tracing-layer")]
pub use layer::JsonLogLayer;

#[cfg(feature = "config")]
pub use env::{from_env, from_env_prefixed, load_dotenv, load_dotenv_from, DEFAULT_PREFIX};
