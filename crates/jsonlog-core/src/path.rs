//! Dotted key paths

use crate::error::{ConfigError, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Location of a node in an attribute tree, e.g. `request.META.REQUEST_METHOD`.
///
/// The path is stored in its rendered form (segments joined with `.`) because
/// every comparison the matcher performs is a dot-boundary string comparison.
/// A segment may itself contain dots (WSGI keys such as `wsgi.version`); such
/// a key then matches rules exactly as its rendered form reads.
#[derive(Clone, Debug, Default)]
pub struct KeyPath {
    rendered: String,
    leaf_start: usize,
}

impl KeyPath {
    /// Path made of a single root segment
    pub fn root(segment: impl Into<String>) -> Self {
        Self {
            rendered: segment.into(),
            leaf_start: 0,
        }
    }

    /// Path extended by one child segment
    pub fn child(&self, segment: &str) -> Self {
        if self.rendered.is_empty() {
            return Self::root(segment);
        }
        let mut rendered = String::with_capacity(self.rendered.len() + 1 + segment.len());
        rendered.push_str(&self.rendered);
        rendered.push('.');
        let leaf_start = rendered.len();
        rendered.push_str(segment);
        Self {
            rendered,
            leaf_start,
        }
    }

    /// Parse a configured rule.
    ///
    /// Rules are split on `.`; empty paths and empty segments are rejected.
    pub fn parse(rule: &str) -> Result<Self> {
        if rule.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if rule.split('.').any(str::is_empty) {
            return Err(ConfigError::EmptySegment(rule.to_string()));
        }
        let leaf_start = rule.rfind('.').map_or(0, |i| i + 1);
        Ok(Self {
            rendered: rule.to_string(),
            leaf_start,
        })
    }

    /// Rendered form
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Last segment
    pub fn leaf(&self) -> &str {
        &self.rendered[self.leaf_start..]
    }

    /// Whether this is the empty path
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// Prefixes of this path (itself included) whose last segment starts
    /// with `_`, shortest first
    pub(crate) fn private_prefixes(&self) -> impl Iterator<Item = KeyPath> + '_ {
        let mut start = 0;
        self.rendered.split('.').filter_map(move |segment| {
            let leaf_start = start;
            start += segment.len() + 1;
            segment.starts_with('_').then(|| KeyPath {
                rendered: self.rendered[..leaf_start + segment.len()].to_string(),
                leaf_start,
            })
        })
    }

    /// `true` if `self` is a strict dot-boundary ancestor of `other`.
    ///
    /// `request.META` is an ancestor of `request.META.X` but not of
    /// `request.METADATA`.
    pub fn is_ancestor_of(&self, other: &KeyPath) -> bool {
        is_dot_prefix(&self.rendered, &other.rendered)
    }

    /// `true` if `self` is a strict dot-boundary descendant of `other`
    pub fn is_descendant_of(&self, other: &KeyPath) -> bool {
        is_dot_prefix(&other.rendered, &self.rendered)
    }
}

/// Strict prefix followed by a `.` in `path`.
fn is_dot_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'.'
}

// Equality is on the rendered form only: a walked path whose leaf is the key
// `wsgi.version` equals the parsed rule `...wsgi.version`.
impl PartialEq for KeyPath {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for KeyPath {}

impl Hash for KeyPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl FromStr for KeyPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}
