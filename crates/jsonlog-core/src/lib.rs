//! # jsonlog-core
//!
//! Key-path filtering and JSON assembly for structured log records.
//!
//! A [`KeyFilter`] holds two sets of dotted key paths. For every node of an
//! attribute tree it answers whether the node is included (it is a rule, lies
//! above a rule, or lies below one) and whether it is excluded (it is a rule
//! or lies below one). The [`Assembler`] walks any [`AttributeSource`] with
//! that filter and rebuilds the surviving part as a nested JSON object.
//! [`RecordFilter`] and [`JsonFormatter`] apply this to [`LogRecord`]s.
//!
//! ## Example
//!
//! ```rust
//! use jsonlog_core::{JsonLogConfig, EncoderChain, LogFormatter, LogRecord};
//! use serde_json::json;
//! use tracing::Level;
//!
//! let config = JsonLogConfig::builder()
//!     .include_key("request.META.REQUEST_METHOD")
//!     .include_key("request.environ")
//!     .exclude_key("request.environ.wsgi")
//!     .remove_empty(true)
//!     .build();
//! let encoders = EncoderChain::new();
//! let filter = config.record_filter(&encoders).unwrap();
//! let formatter = config.formatter(&encoders).unwrap();
//!
//! let request = json!({
//!     "META": {"REQUEST_METHOD": "GET", "SERVER_NAME": "testserver"},
//!     "environ": {"PATH_INFO": "/my_path", "wsgi.url_scheme": "http"},
//! });
//! let mut record = LogRecord::new(Level::INFO, "Simple message").with_source("request", &request);
//! filter.apply(&mut record);
//!
//! assert_eq!(
//!     formatter.format(&record),
//!     r#"{"level":"INFO","message":"Simple message","request":{"META":{"REQUEST_METHOD":"GET"},"environ":{"PATH_INFO":"/my_path"}}}"#
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod assemble;
mod config;
mod encoder;
mod error;
mod filter;
mod formatter;
mod matcher;
mod path;
pub mod record;
mod source;

// Public API
pub use assemble::{insert_nested, is_empty_value, remove_empty, Assembler, DEFAULT_MAX_DEPTH};
pub use config::{FieldMap, JsonLogConfig, JsonLogConfigBuilder};
pub use encoder::{fallback, Encoder, EncoderChain, FALLBACK_KEY};
pub use error::{AccessError, ConfigError, Result};
pub use filter::{RecordFilter, DEFAULT_ATTRIBUTE};
pub use formatter::{default_fields, JsonFormatter, LogFormatter};
pub use matcher::{KeyFilter, RuleSet};
pub use path::KeyPath;
pub use record::{LogRecord, RecordValue};
pub use source::{Attr, AttributeSource, Kind, Opaque};
