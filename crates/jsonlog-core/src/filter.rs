//! Record filter applying key rules to one record attribute

use crate::assemble::{Assembler, DEFAULT_MAX_DEPTH};
use crate::encoder::EncoderChain;
use crate::matcher::KeyFilter;
use crate::record::{LogRecord, RecordValue};
use crate::source::AttributeSource;

/// Attribute filtered when none is configured
pub const DEFAULT_ATTRIBUTE: &str = "request";

/// Replaces one record attribute by its filtered JSON document.
///
/// The attribute name is the root segment of every key rule, so the rule
/// `request.META.REQUEST_METHOD` addresses `META.REQUEST_METHOD` inside the
/// `request` attribute.
#[derive(Clone, Debug)]
pub struct RecordFilter {
    attribute: String,
    keys: KeyFilter,
    encoders: EncoderChain,
    max_depth: usize,
}

impl RecordFilter {
    /// Filter the default `request` attribute
    pub fn new(keys: KeyFilter) -> Self {
        Self {
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            keys,
            encoders: EncoderChain::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Filter another attribute
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Encoder hooks for opaque values met during the walk
    pub fn encoders(mut self, encoders: EncoderChain) -> Self {
        self.encoders = encoders;
        self
    }

    /// Depth guard for the walk
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Name of the filtered attribute
    pub fn attribute_name(&self) -> &str {
        &self.attribute
    }

    /// The key rules
    pub fn keys(&self) -> &KeyFilter {
        &self.keys
    }

    /// Filter the attribute in place.
    ///
    /// Records without the attribute pass unchanged. When the filter rejects
    /// the attribute's root it is removed from the record. Always returns
    /// `true`: the record itself is never dropped.
    pub fn apply(&self, record: &mut LogRecord<'_>) -> bool {
        let Some(value) = record.take(&self.attribute) else {
            return true;
        };
        let filtered = match &value {
            RecordValue::Json(json) => self.assemble(json),
            RecordValue::Source(source) => self.assemble(*source),
        };
        if let Some(document) = filtered {
            record.set(self.attribute.clone(), RecordValue::Json(document));
        }
        true
    }

    /// Filtered document for a standalone source
    pub fn assemble(&self, source: &dyn AttributeSource) -> Option<serde_json::Value> {
        Assembler::new(&self.keys, &self.encoders)
            .max_depth(self.max_depth)
            .assemble(&self.attribute, source)
    }
}
