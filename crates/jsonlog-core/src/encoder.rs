//! Encoder hooks for values the assembler cannot represent

use crate::source::AttributeSource;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Key of the record produced for values no hook can render
pub const FALLBACK_KEY: &str = "repr";

/// Renders a value the assembler could not represent.
///
/// Return `None` for any value the encoder does not know; the next encoder in
/// the chain is then consulted.
pub trait Encoder: Send + Sync {
    /// JSON form of `value`, or `None` when not handled
    fn render(&self, value: &dyn AttributeSource) -> Option<Value>;
}

impl<F> Encoder for F
where
    F: Fn(&dyn AttributeSource) -> Option<Value> + Send + Sync,
{
    fn render(&self, value: &dyn AttributeSource) -> Option<Value> {
        self(value)
    }
}

/// Ordered list of encoder hooks with a string fallback
#[derive(Clone, Default)]
pub struct EncoderChain {
    hooks: Vec<Arc<dyn Encoder>>,
}

impl EncoderChain {
    /// Chain with no hooks; everything goes to the fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook
    pub fn with(mut self, encoder: impl Encoder + 'static) -> Self {
        self.hooks.push(Arc::new(encoder));
        self
    }

    /// Append a shared hook
    pub fn with_shared(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.hooks.push(encoder);
        self
    }

    /// Number of hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the chain has no hooks
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Render through the hooks, then the fallback. Never fails.
    pub fn render(&self, value: &dyn AttributeSource) -> Value {
        self.hooks
            .iter()
            .find_map(|hook| hook.render(value))
            .unwrap_or_else(|| fallback(value))
    }
}

impl fmt::Debug for EncoderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// One-field record holding the string form of `value`
pub fn fallback(value: &dyn AttributeSource) -> Value {
    json!({ FALLBACK_KEY: value.describe() })
}
