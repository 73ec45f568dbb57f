//! # jsonlog
//!
//! JSON log formatting with dotted key-path filtering.
//!
//! Log records carrying rich objects (an HTTP request, a job, a session) are
//! rendered as a single JSON document. Include and exclude rules written as
//! dotted paths (`request.META.REQUEST_METHOD`, `request.environ.wsgi`) pick
//! which parts of those objects reach the output.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jsonlog::prelude::*;
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let config = JsonLogConfig::builder()
//!     .include_key("request.method")
//!     .include_key("request.path")
//!     .remove_empty(true)
//!     .build();
//!
//! let layer = JsonLogLayer::new(&config)?;
//! tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layer))?;
//!
//! tracing::info!(request.method = "GET", request.path = "/", "served");
//! // {"level":"INFO","message":"served","request":{"method":"GET","path":"/"}}
//! ```
//!
//! ## Optional Features
//!
//! - `http` - `http::Request` adapter and [`RequestLogger`]
//! - `tracing-layer` - [`JsonLogLayer`] for `tracing-subscriber`
//! - `config` - configuration from `JSONLOG_*` variables and `.env` files
//! - `full` - All optional features enabled
//!
//! ```toml
//! [dependencies]
//! jsonlog = { version = "0.1", default-features = false, features = ["tracing-layer"] }
//! ```

// Re-export core functionality
pub use jsonlog_core::*;

// Re-export extras (feature-gated)
#[cfg(any(feature = "http", feature = "tracing-layer", feature = "config"))]
pub use jsonlog_extras::{Error, REQUEST_TARGET};

#[cfg(feature = "http")]
pub use jsonlog_extras::http;
#[cfg(feature = "http")]
pub use jsonlog_extras::{
    default_redactions, flatten_request, HttpRequestEncoder, HttpRequestSource, RequestLogger,
};

#[cfg(feature = "tracing-layer")]
pub use jsonlog_extras::JsonLogLayer;

#[cfg(feature = "config")]
pub use jsonlog_extras::env;
#[cfg(feature = "config")]
pub use jsonlog_extras::{from_env, from_env_prefixed, load_dotenv, load_dotenv_from};

// Re-export commonly used crates
pub use serde_json;
pub use tracing;

/// Prelude module - import everything you need with `use jsonlog::prelude::*`
pub mod prelude {
    pub use jsonlog_core::{
        AttributeSource, Encoder, EncoderChain, JsonFormatter, JsonLogConfig, KeyFilter,
        LogFormatter, LogRecord, Opaque, RecordFilter,
    };

    #[cfg(feature = "http")]
    pub use jsonlog_extras::{HttpRequestEncoder, HttpRequestSource, RequestLogger};

    #[cfg(feature = "tracing-layer")]
    pub use jsonlog_extras::JsonLogLayer;

    #[cfg(feature = "config")]
    pub use jsonlog_extras::{from_env, load_dotenv};

    pub use serde_json::{json, Value};
    pub use tracing::Level;
}
