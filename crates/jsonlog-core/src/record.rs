//! Log records

use crate::source::AttributeSource;
use serde_json::{Map, Value};
use std::fmt;
use std::time::SystemTime;
use tracing::Level;

/// Names of the attributes every record carries
pub mod attrs {
    /// Upper-case level name (`INFO`)
    pub const LEVELNAME: &str = "levelname";
    /// Numeric level (`20` for `INFO`)
    pub const LEVELNO: &str = "levelno";
    /// Rendered message
    pub const MESSAGE: &str = "message";
    /// Logger name (the tracing target)
    pub const NAME: &str = "name";
    /// Module path of the call site
    pub const MODULE: &str = "module";
    /// Source file of the call site
    pub const PATHNAME: &str = "pathname";
    /// Source line of the call site
    pub const LINENO: &str = "lineno";
    /// Creation time in seconds since the Unix epoch
    pub const CREATED: &str = "created";
}

/// Value attached to a record under an attribute name
pub enum RecordValue<'a> {
    /// Already rendered JSON
    Json(Value),
    /// Source still to be walked
    Source(&'a dyn AttributeSource),
}

impl fmt::Debug for RecordValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RecordValue::Source(source) => {
                f.debug_tuple("Source").field(&source.describe()).finish()
            }
        }
    }
}

impl From<Value> for RecordValue<'_> {
    fn from(value: Value) -> Self {
        RecordValue::Json(value)
    }
}

/// One logged event, before formatting
#[derive(Debug)]
pub struct LogRecord<'a> {
    /// Severity
    pub level: Level,
    /// Rendered message
    pub message: String,
    /// Logger name
    pub name: String,
    /// Module path of the call site
    pub module: Option<String>,
    /// Source file of the call site
    pub file: Option<String>,
    /// Source line of the call site
    pub line: Option<u32>,
    /// Creation time
    pub created: SystemTime,
    /// Extra attributes, in insertion order
    pub extra: Vec<(String, RecordValue<'a>)>,
}

impl<'a> LogRecord<'a> {
    /// Create a record at `level`
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            name: "root".to_string(),
            module: None,
            file: None,
            line: None,
            created: SystemTime::now(),
            extra: Vec::new(),
        }
    }

    /// Set the logger name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the call site
    pub fn location(
        mut self,
        module: Option<&str>,
        file: Option<&str>,
        line: Option<u32>,
    ) -> Self {
        self.module = module.map(String::from);
        self.file = file.map(String::from);
        self.line = line;
        self
    }

    /// Attach a rendered JSON attribute
    pub fn with_json(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, RecordValue::Json(value));
        self
    }

    /// Attach a source to be walked at format time
    pub fn with_source(mut self, name: impl Into<String>, source: &'a dyn AttributeSource) -> Self {
        self.set(name, RecordValue::Source(source));
        self
    }

    /// Set an extra attribute, replacing any previous value under the name
    pub fn set(&mut self, name: impl Into<String>, value: RecordValue<'a>) {
        let name = name.into();
        match self.extra.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.extra.push((name, value)),
        }
    }

    /// Extra attribute by name
    pub fn extra(&self, name: &str) -> Option<&RecordValue<'a>> {
        self.extra.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Remove and return an extra attribute
    pub fn take(&mut self, name: &str) -> Option<RecordValue<'a>> {
        let index = self.extra.iter().position(|(n, _)| n == name)?;
        Some(self.extra.remove(index).1)
    }

    /// Upper-case level name
    pub fn levelname(&self) -> &'static str {
        match self.level {
            Level::TRACE => "TRACE",
            Level::DEBUG => "DEBUG",
            Level::INFO => "INFO",
            Level::WARN => "WARNING",
            Level::ERROR => "ERROR",
        }
    }

    /// Numeric level on the conventional 10-step scale
    pub fn levelno(&self) -> u8 {
        match self.level {
            Level::TRACE => 5,
            Level::DEBUG => 10,
            Level::INFO => 20,
            Level::WARN => 30,
            Level::ERROR => 40,
        }
    }

    /// Built-in attribute by name, `None` for extra or unknown names
    pub fn builtin(&self, name: &str) -> Option<Value> {
        let value = match name {
            attrs::LEVELNAME => Value::from(self.levelname()),
            attrs::LEVELNO => Value::from(self.levelno()),
            attrs::MESSAGE => Value::from(self.message.as_str()),
            attrs::NAME => Value::from(self.name.as_str()),
            attrs::MODULE => self.module.clone().map_or(Value::Null, Value::from),
            attrs::PATHNAME => self.file.clone().map_or(Value::Null, Value::from),
            attrs::LINENO => self.line.map_or(Value::Null, Value::from),
            attrs::CREATED => Value::from(
                self.created
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs_f64(),
            ),
            _ => return None,
        };
        Some(value)
    }

    /// Rendered extras as an object, sources described by their string form
    pub fn extra_summary(&self) -> Map<String, Value> {
        self.extra
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    RecordValue::Json(v) => v.clone(),
                    RecordValue::Source(s) => Value::from(s.describe()),
                };
                (name.clone(), rendered)
            })
            .collect()
    }
}
