//! JSON record formatter

use crate::assemble::{remove_empty, Assembler, DEFAULT_MAX_DEPTH};
use crate::encoder::EncoderChain;
use crate::matcher::KeyFilter;
use crate::record::{attrs, LogRecord, RecordValue};
use serde_json::{Map, Value};

/// Trait for record formatters
pub trait LogFormatter: Send + Sync {
    /// Format a record to a single line (or block, when pretty printing)
    fn format(&self, record: &LogRecord<'_>) -> String;
}

/// Output fields used when none are configured
pub fn default_fields() -> Vec<(String, String)> {
    vec![
        ("level".to_string(), attrs::LEVELNAME.to_string()),
        ("message".to_string(), attrs::MESSAGE.to_string()),
        ("request".to_string(), "request".to_string()),
    ]
}

/// JSON log formatter.
///
/// The document has one entry per configured output field, in configuration
/// order. Each field names a record attribute: a built-in one
/// (`levelname`, `message`, ...) or an extra one. Sources still attached to
/// the record are rendered in full; apply a
/// [`RecordFilter`](crate::RecordFilter) first to restrict them.
#[derive(Clone, Debug)]
pub struct JsonFormatter {
    fields: Vec<(String, String)>,
    remove_empty: bool,
    pretty: bool,
    encoders: EncoderChain,
    max_depth: usize,
    render_all: KeyFilter,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(default_fields())
    }
}

impl JsonFormatter {
    /// Create a formatter from `(output field, record attribute)` pairs
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            remove_empty: false,
            pretty: false,
            encoders: EncoderChain::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            render_all: KeyFilter::allow_all(),
        }
    }

    /// Drop `null`, `""`, `[]` and `{}` values at every level
    pub fn remove_empty(mut self, remove: bool) -> Self {
        self.remove_empty = remove;
        self
    }

    /// Pretty-print the document
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Encoder hooks for opaque values
    pub fn encoders(mut self, encoders: EncoderChain) -> Self {
        self.encoders = encoders;
        self
    }

    /// Depth guard for rendering unfiltered sources
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Configured output fields
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Build the document for a record
    pub fn document(&self, record: &LogRecord<'_>) -> Value {
        let mut doc = Map::new();
        for (output, attribute) in &self.fields {
            doc.insert(output.clone(), self.field(record, attribute));
        }
        let mut doc = Value::Object(doc);
        if self.remove_empty {
            remove_empty(&mut doc);
        }
        doc
    }

    fn field(&self, record: &LogRecord<'_>, attribute: &str) -> Value {
        if let Some(value) = record.builtin(attribute) {
            return value;
        }
        match record.extra(attribute) {
            Some(RecordValue::Json(value)) => value.clone(),
            Some(RecordValue::Source(source)) => Assembler::new(&self.render_all, &self.encoders)
                .max_depth(self.max_depth)
                .assemble(attribute, *source)
                .unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord<'_>) -> String {
        let doc = self.document(record);
        if self.pretty {
            serde_json::to_string_pretty(&doc).unwrap_or_default()
        } else {
            serde_json::to_string(&doc).unwrap_or_default()
        }
    }
}
