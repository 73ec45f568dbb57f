//! Error types for jsonlog-core

use thiserror::Error;

/// Result type alias for configuration-time operations
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Errors raised while building filters and formatters.
///
/// These are the only errors surfaced to the operator. Everything that can go
/// wrong while a record is being filtered or rendered is recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A key rule was the empty string
    #[error("key path must not be empty")]
    EmptyPath,

    /// A key rule contained an empty segment (`a..b`, `.a`, `a.`)
    #[error("key path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// The output field mapping has no entries
    #[error("at least one output field must be configured")]
    NoFields,

    /// An output field name was empty
    #[error("output field for attribute '{0}' has an empty name")]
    EmptyFieldName(String),

    /// The depth guard was set to zero
    #[error("max_depth must be greater than zero")]
    ZeroDepth,

    /// The filtered record attribute was empty
    #[error("filtered attribute name must not be empty")]
    EmptyAttribute,
}

/// Failure to read a child of an attribute source.
///
/// The assembler treats any of these as "no value" for the node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The source has no attribute or key with this name
    #[error("no attribute named '{0}'")]
    Missing(String),

    /// The source cannot be introspected
    #[error("value of kind {0} is not introspectable")]
    NotIntrospectable(&'static str),

    /// The attribute exists but could not be read
    #[error("attribute '{name}' is unreadable: {reason}")]
    Unreadable {
        /// Attribute name
        name: String,
        /// Why the read failed
        reason: String,
    },
}
