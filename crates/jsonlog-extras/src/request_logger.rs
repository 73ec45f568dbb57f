//! Request logging
//!
//! [`RequestLogger`] turns an `http::Request` and a message into one filtered
//! JSON document and emits it as a `tracing` event on
//! [`REQUEST_TARGET`](crate::REQUEST_TARGET).

use crate::error::Result;
use crate::http::{default_redactions, flatten_request, HttpRequestEncoder, HttpRequestSource};
use crate::REQUEST_TARGET;
use http::Request;
use jsonlog_core::{
    EncoderChain, JsonFormatter, JsonLogConfig, LogFormatter, LogRecord, RecordFilter,
};
use std::any::Any;
use std::collections::HashSet;
use tracing::Level;

/// Logs requests as filtered JSON documents
#[derive(Clone, Debug)]
pub struct RequestLogger {
    filter: RecordFilter,
    formatter: JsonFormatter,
    redact: HashSet<String>,
    flatten: bool,
}

impl RequestLogger {
    /// Create a logger from a validated configuration.
    ///
    /// Requests of body type `B` met as opaque values are rendered by a
    /// [`HttpRequestEncoder`].
    pub fn new<B: Any>(config: &JsonLogConfig) -> Result<Self> {
        let encoders = EncoderChain::new().with(HttpRequestEncoder::<B>::new());
        Self::with_encoders(config, &encoders)
    }

    /// Create a logger with a caller-supplied encoder chain
    pub fn with_encoders(config: &JsonLogConfig, encoders: &EncoderChain) -> Result<Self> {
        Ok(Self {
            filter: config.record_filter(encoders)?,
            formatter: config.formatter(encoders)?,
            redact: default_redactions().clone(),
            flatten: false,
        })
    }

    /// Add a header to the redaction set
    pub fn redact_header(mut self, name: impl AsRef<str>) -> Self {
        self.redact.insert(name.as_ref().to_ascii_lowercase());
        self
    }

    /// Also attach `request_method` and `request_path` to each record
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Render the document for a request without emitting it
    pub fn render<B>(&self, level: Level, message: &str, request: &Request<B>) -> String {
        let source = HttpRequestSource::new(request).redact(&self.redact);
        let mut record = LogRecord::new(level, message)
            .name(REQUEST_TARGET)
            .with_source(self.filter.attribute_name().to_string(), &source);
        if self.flatten {
            flatten_request(&mut record, request);
        }
        self.filter.apply(&mut record);
        self.formatter.format(&record)
    }

    /// Render and emit the document at `level`
    pub fn log<B>(&self, level: Level, message: &str, request: &Request<B>) {
        let line = self.render(level, message, request);
        match level {
            Level::TRACE => tracing::trace!(target: REQUEST_TARGET, "{}", line),
            Level::DEBUG => tracing::debug!(target: REQUEST_TARGET, "{}", line),
            Level::INFO => tracing::info!(target: REQUEST_TARGET, "{}", line),
            Level::WARN => tracing::warn!(target: REQUEST_TARGET, "{}", line),
            Level::ERROR => tracing::error!(target: REQUEST_TARGET, "{}", line),
        }
    }
}
