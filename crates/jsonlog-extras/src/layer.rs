//! `tracing-subscriber` layer
//!
//! [`JsonLogLayer`] turns every event into a [`LogRecord`], runs it through the
//! configured [`RecordFilter`] and writes the formatted document, one per
//! line. Event fields with dotted names are nested, so
//! `info!(request.method = "GET", request.path = "/", "served")` fills the
//! `request` attribute with `{"method": "GET", "path": "/"}` before the key
//! rules apply.

use crate::error::Result;
use crate::REQUEST_TARGET;
use jsonlog_core::{
    insert_nested, EncoderChain, JsonFormatter, JsonLogConfig, LogFormatter, LogRecord,
    RecordFilter, RecordValue,
};
use serde_json::{Map, Value};
use std::fmt;
use std::io::{self, Write};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Modules whose diagnostics the layer never formats
const OWN_TARGETS: [&str; 2] = ["jsonlog_core", "jsonlog_extras::env"];

/// `target` is one of [`OWN_TARGETS`] or a module below one
fn is_own_target(target: &str) -> bool {
    OWN_TARGETS.iter().any(|own| {
        target
            .strip_prefix(own)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Layer writing filtered JSON documents
pub struct JsonLogLayer<W = fn() -> io::Stdout> {
    filter: RecordFilter,
    formatter: JsonFormatter,
    make_writer: W,
}

impl JsonLogLayer {
    /// Create a layer writing to stdout
    pub fn new(config: &JsonLogConfig) -> Result<Self> {
        Self::with_encoders(config, &EncoderChain::new())
    }

    /// Create a layer writing to stdout with a caller-supplied encoder chain
    pub fn with_encoders(config: &JsonLogConfig, encoders: &EncoderChain) -> Result<Self> {
        Ok(Self {
            filter: config.record_filter(encoders)?,
            formatter: config.formatter(encoders)?,
            make_writer: io::stdout,
        })
    }
}

impl<W> JsonLogLayer<W> {
    /// Write documents somewhere else
    pub fn with_writer<W2>(self, make_writer: W2) -> JsonLogLayer<W2>
    where
        W2: for<'a> MakeWriter<'a> + 'static,
    {
        JsonLogLayer {
            filter: self.filter,
            formatter: self.formatter,
            make_writer,
        }
    }

    fn record<'a>(&self, event: &Event<'_>) -> LogRecord<'a> {
        let meta = event.metadata();
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let mut record = LogRecord::new(*meta.level(), visitor.message.unwrap_or_default())
            .name(meta.target())
            .location(meta.module_path(), meta.file(), meta.line());
        for (name, value) in visitor.fields {
            record.set(name, RecordValue::Json(value));
        }
        record
    }
}

impl<W> fmt::Debug for JsonLogLayer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLogLayer")
            .field("filter", &self.filter)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

impl<S, W> Layer<S> for JsonLogLayer<W>
where
    S: Subscriber,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }

        let mut line = if meta.target() == REQUEST_TARGET {
            // Already a formatted document
            let mut visitor = JsonVisitor::default();
            event.record(&mut visitor);
            visitor.message.unwrap_or_default()
        } else {
            let mut record = self.record(event);
            self.filter.apply(&mut record);
            self.formatter.format(&record)
        };
        line.push('\n');

        let mut writer = self.make_writer.make_writer_for(meta);
        let _ = writer.write_all(line.as_bytes());
    }
}

/// Collects event fields as JSON, nesting dotted names
#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            insert_nested(&mut self.fields, field.name(), value);
        }
    }
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl TestWriter {
        fn lines(&self) -> Vec<Value> {
            let buffer = self.buffer.lock().unwrap();
            String::from_utf8_lossy(&buffer)
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer
                .lock()
                .map_err(|_| io::Error::other("Mutex poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for TestWriter {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(config: JsonLogConfig, f: impl FnOnce()) -> Vec<Value> {
        let writer = TestWriter::default();
        let layer = JsonLogLayer::new(&config).unwrap().with_writer(writer.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        writer.lines()
    }

    #[test]
    fn test_dotted_fields_are_filtered() {
        let config = JsonLogConfig::builder()
            .include_key("request.method")
            .exclude_key("request.headers")
            .build();
        let lines = capture(config, || {
            tracing::event!(
                target: "app",
                tracing::Level::INFO,
                request.method = "GET",
                request.path = "/my_path",
                request.headers.cookie = "a=b",
                "Simple message"
            );
        });

        assert_eq!(
            lines,
            vec![json!({
                "level": "INFO",
                "message": "Simple message",
                "request": {"method": "GET"}
            })]
        );
    }

    #[test]
    fn test_event_without_request_has_null_field() {
        let lines = capture(JsonLogConfig::default(), || {
            tracing::warn!(target: "app", attempt = 3, "retrying");
        });
        assert_eq!(
            lines,
            vec![json!({"level": "WARNING", "message": "retrying", "request": null})]
        );
    }

    #[test]
    fn test_remove_empty_and_custom_fields() {
        let config = JsonLogConfig::builder()
            .fields([("msg", "message"), ("attempt", "attempt"), ("request", "request")])
            .remove_empty(true)
            .build();
        let lines = capture(config, || {
            tracing::error!(target: "app", attempt = 3, ok = false, "failed");
        });
        assert_eq!(lines, vec![json!({"msg": "failed", "attempt": 3})]);
    }

    #[test]
    fn test_own_diagnostics_are_skipped() {
        let lines = capture(JsonLogConfig::default(), || {
            let config = JsonLogConfig::default();
            let _ = config.record_filter(&EncoderChain::new());
            tracing::info!(target: "app", "after");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "after");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_env_diagnostics_are_skipped() {
        let lines = capture(JsonLogConfig::default(), || {
            let _ = crate::env::from_env_prefixed("JLLAYER");
            tracing::info!(target: "app", "after");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "after");
    }

    #[test]
    fn test_similarly_named_targets_are_formatted() {
        let lines = capture(JsonLogConfig::default(), || {
            tracing::info!(target: "jsonlog_extras_app::jobs", "job done");
            tracing::info!(target: "jsonlog_core_ext", "ext loaded");
            tracing::info!(target: "jsonlog_extras::layer::tests", "layer test");
        });
        let messages: Vec<&str> = lines
            .iter()
            .map(|line| line["message"].as_str().unwrap())
            .collect();
        assert_eq!(messages, vec!["job done", "ext loaded", "layer test"]);
    }

    #[test]
    fn test_own_target_boundaries() {
        assert!(is_own_target("jsonlog_core"));
        assert!(is_own_target("jsonlog_core::config"));
        assert!(is_own_target("jsonlog_extras::env"));
        assert!(!is_own_target("jsonlog_core_ext"));
        assert!(!is_own_target("jsonlog_extras::environment"));
        assert!(!is_own_target("jsonlog_extras::layer"));
        assert!(!is_own_target("app"));
    }

    #[test]
    fn test_preformatted_request_documents_pass_through() {
        let lines = capture(JsonLogConfig::default(), || {
            let line = r#"{"message":"m","request":{"method":"GET"}}"#;
            tracing::info!(target: "jsonlog::request", "{}", line);
        });
        assert_eq!(lines, vec![json!({"message": "m", "request": {"method": "GET"}})]);
    }
}
