//! Caller-owned logging configuration
//!
//! A [`JsonLogConfig`] is built once at startup (programmatically through the
//! builder, or deserialized from a settings file or the environment) and then
//! turned into the immutable [`RecordFilter`] and [`JsonFormatter`] used for
//! every event. All validation happens here, so nothing configuration-related
//! can fail while an event is being logged.

use crate::assemble::DEFAULT_MAX_DEPTH;
use crate::encoder::EncoderChain;
use crate::error::{ConfigError, Result};
use crate::filter::{RecordFilter, DEFAULT_ATTRIBUTE};
use crate::formatter::{default_fields, JsonFormatter};
use crate::matcher::{KeyFilter, RuleSet};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Ordered mapping from output field name to record attribute name.
///
/// Deserializes from a map (`{"level": "levelname"}`) or from a
/// comma-separated string (`level=levelname,message=message`); the latter is
/// the form used in environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMap(pub Vec<(String, String)>);

impl Default for FieldMap {
    fn default() -> Self {
        FieldMap(default_fields())
    }
}

impl FieldMap {
    /// Parse the `out=attr,out=attr` form. A bare `name` maps to itself.
    pub fn parse(value: &str) -> Self {
        FieldMap(
            value.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| match entry.split_once('=') {
                    Some((out, attr)) => (out.trim().to_string(), attr.trim().to_string()),
                    None => (entry.to_string(), entry.to_string()),
                })
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of output field to record attribute, or \"out=attr,...\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FieldMap, E> {
                Ok(FieldMap::parse(v))
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<FieldMap, A::Error> {
                let mut fields = Vec::new();
                while let Some((out, attr)) = access.next_entry::<String, String>()? {
                    fields.push((out, attr));
                }
                Ok(FieldMap(fields))
            }
        }

        deserializer.deserialize_any(FieldMapVisitor)
    }
}

/// Key filtering and JSON formatting configuration
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonLogConfig {
    /// Dotted paths to include; empty includes everything
    pub include_keys: Vec<String>,
    /// Dotted paths to exclude; empty excludes nothing
    pub exclude_keys: Vec<String>,
    /// Drop empty values from the output document
    pub remove_empty: bool,
    /// Require `_`-prefixed segments to be named by an include rule
    pub hide_private: bool,
    /// Depth guard for attribute walks
    pub max_depth: usize,
    /// Pretty-print documents
    pub pretty: bool,
    /// Record attribute the key rules apply to
    pub attribute: String,
    /// Output fields, in document order
    pub fields: FieldMap,
}

impl Default for JsonLogConfig {
    fn default() -> Self {
        Self {
            include_keys: Vec::new(),
            exclude_keys: Vec::new(),
            remove_empty: false,
            hide_private: false,
            max_depth: DEFAULT_MAX_DEPTH,
            pretty: false,
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            fields: FieldMap::default(),
        }
    }
}

impl JsonLogConfig {
    /// Create a new builder for JsonLogConfig
    pub fn builder() -> JsonLogConfigBuilder {
        JsonLogConfigBuilder::default()
    }

    /// Check the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.key_filter()?;
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.attribute.is_empty() {
            return Err(ConfigError::EmptyAttribute);
        }
        if self.fields.0.is_empty() {
            return Err(ConfigError::NoFields);
        }
        if let Some((_, attr)) = self.fields.0.iter().find(|(out, _)| out.is_empty()) {
            return Err(ConfigError::EmptyFieldName(attr.clone()));
        }
        Ok(())
    }

    /// Parsed key rules
    pub fn key_filter(&self) -> Result<KeyFilter> {
        let include = RuleSet::parse(&self.include_keys)?;
        let exclude = RuleSet::parse(&self.exclude_keys)?;
        Ok(KeyFilter::new(include, exclude).hide_private(self.hide_private))
    }

    /// Record filter for the configured attribute
    pub fn record_filter(&self, encoders: &EncoderChain) -> Result<RecordFilter> {
        self.validate()?;
        let filter = RecordFilter::new(self.key_filter()?)
            .attribute(self.attribute.clone())
            .encoders(encoders.clone())
            .max_depth(self.max_depth);
        tracing::debug!(
            attribute = %self.attribute,
            include = self.include_keys.len(),
            exclude = self.exclude_keys.len(),
            "record filter built"
        );
        Ok(filter)
    }

    /// Formatter for the configured fields
    pub fn formatter(&self, encoders: &EncoderChain) -> Result<JsonFormatter> {
        self.validate()?;
        Ok(JsonFormatter::new(self.fields.0.iter().cloned())
            .remove_empty(self.remove_empty)
            .pretty(self.pretty)
            .encoders(encoders.clone())
            .max_depth(self.max_depth))
    }
}

/// Builder for JsonLogConfig
#[derive(Default)]
pub struct JsonLogConfigBuilder {
    config: JsonLogConfig,
}

impl JsonLogConfigBuilder {
    /// Add an include rule
    pub fn include_key(mut self, key: impl Into<String>) -> Self {
        self.config.include_keys.push(key.into());
        self
    }

    /// Set include rules
    pub fn include_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.include_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add an exclude rule
    pub fn exclude_key(mut self, key: impl Into<String>) -> Self {
        self.config.exclude_keys.push(key.into());
        self
    }

    /// Set exclude rules
    pub fn exclude_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether to drop empty values
    pub fn remove_empty(mut self, remove: bool) -> Self {
        self.config.remove_empty = remove;
        self
    }

    /// Set whether private segments need an explicit include rule
    pub fn hide_private(mut self, hide: bool) -> Self {
        self.config.hide_private = hide;
        self
    }

    /// Set the depth guard
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set whether to pretty-print
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    /// Set the filtered record attribute
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.config.attribute = attribute.into();
        self
    }

    /// Replace the output fields
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config.fields = FieldMap(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Append one output field
    pub fn field(mut self, output: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.config.fields.0.push((output.into(), attribute.into()));
        self
    }

    /// Build the configuration
    pub fn build(self) -> JsonLogConfig {
        self.config
    }
}
