//! Include/exclude key-path matching
//!
//! A [`KeyFilter`] decides for every node of an attribute tree whether it
//! survives. The include test admits a configured path, every ancestor of one
//! (so the walk can reach it) and every descendant of one (the whole subtree
//! once its root is admitted). The exclude test removes a configured path and
//! its descendants, never an ancestor.

use crate::error::Result;
use crate::path::KeyPath;

/// Set of configured key paths
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<KeyPath>,
}

impl RuleSet {
    /// Parse rules, dropping duplicates while keeping the first occurrence.
    ///
    /// Surrounding whitespace is trimmed from each rule.
    pub fn parse<I, S>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<KeyPath> = Vec::new();
        for rule in rules {
            let path = KeyPath::parse(rule.as_ref().trim())?;
            if !parsed.contains(&path) {
                parsed.push(path);
            }
        }
        Ok(Self { rules: parsed })
    }

    /// Whether no rule is configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Configured rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &KeyPath> {
        self.rules.iter()
    }

    /// Some rule equals `path` or lies below it
    fn names(&self, path: &KeyPath) -> bool {
        self.rules
            .iter()
            .any(|rule| rule == path || path.is_ancestor_of(rule))
    }

    /// Some rule equals `path` or lies above it
    fn covers(&self, path: &KeyPath) -> bool {
        self.rules
            .iter()
            .any(|rule| rule == path || path.is_descendant_of(rule))
    }
}

/// Include/exclude predicate pair over dotted key paths.
///
/// Built once at configuration time and shared read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyFilter {
    include: RuleSet,
    exclude: RuleSet,
    hide_private: bool,
}

impl KeyFilter {
    /// Create a filter from include and exclude rules
    pub fn new(include: RuleSet, exclude: RuleSet) -> Self {
        Self {
            include,
            exclude,
            hide_private: false,
        }
    }

    /// Parse both rule sets from dotted strings
    pub fn from_rules<I, E, S, T>(include: I, exclude: E) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Ok(Self::new(RuleSet::parse(include)?, RuleSet::parse(exclude)?))
    }

    /// Filter that admits everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Require every segment starting with `_` to be named explicitly by an
    /// include rule (or an include rule below it) for the path to pass the
    /// include test. Descendants of a hidden segment are hidden too.
    pub fn hide_private(mut self, hide: bool) -> Self {
        self.hide_private = hide;
        self
    }

    /// Include rules
    pub fn include_rules(&self) -> &RuleSet {
        &self.include
    }

    /// Exclude rules
    pub fn exclude_rules(&self) -> &RuleSet {
        &self.exclude
    }

    /// Include test.
    ///
    /// `true` when no include rule is configured, otherwise when `path` is a
    /// rule, an ancestor of a rule, or a descendant of a rule.
    pub fn included(&self, path: &KeyPath) -> bool {
        if self.hide_private && self.hides(path) {
            return false;
        }
        self.include.is_empty() || self.include.names(path) || self.include.covers(path)
    }

    /// Exclude test.
    ///
    /// `true` only when `path` is a rule or a descendant of one.
    pub fn excluded(&self, path: &KeyPath) -> bool {
        !self.exclude.is_empty() && self.exclude.covers(path)
    }

    /// Final verdict for a node
    pub fn allows(&self, path: &KeyPath) -> bool {
        self.included(path) && !self.excluded(path)
    }

    /// Some private segment of `path` is not named by an include rule
    fn hides(&self, path: &KeyPath) -> bool {
        path.private_prefixes().any(|prefix| !self.include.names(&prefix))
    }
}
