//! Configuration from the environment
//!
//! Every [`JsonLogConfig`] field maps to a prefixed variable:
//!
//! | variable | example |
//! |----------|---------|
//! | `JSONLOG_INCLUDE_KEYS` | `request.META.REQUEST_METHOD,request.environ` |
//! | `JSONLOG_EXCLUDE_KEYS` | `request.environ.wsgi` |
//! | `JSONLOG_REMOVE_EMPTY` | `true` |
//! | `JSONLOG_HIDE_PRIVATE` | `false` |
//! | `JSONLOG_MAX_DEPTH` | `32` |
//! | `JSONLOG_PRETTY` | `false` |
//! | `JSONLOG_ATTRIBUTE` | `request` |
//! | `JSONLOG_FIELDS` | `level=levelname,message=message,request=request` |
//!
//! Unset variables keep their defaults.
//!
//! # Example
//!
//! ```ignore
//! use jsonlog_extras::{from_env, load_dotenv, JsonLogLayer};
//!
//! load_dotenv();
//! let config = from_env()?;
//! let layer = JsonLogLayer::new(&config)?;
//! ```

use crate::error::{Error, Result};
use jsonlog_core::JsonLogConfig;
use std::path::Path;

/// Prefix used by [`from_env`]
pub const DEFAULT_PREFIX: &str = "JSONLOG";

/// Load a `.env` file from the current directory or its parents.
///
/// A missing file is not an error. Variables already set take precedence.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load variables from a specific file
pub fn load_dotenv_from<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    dotenvy::from_path(path).map_err(|source| Error::Dotenv {
        path: path.display().to_string(),
        source,
    })
}

/// Read and validate the configuration from `JSONLOG_*` variables
pub fn from_env() -> Result<JsonLogConfig> {
    from_env_prefixed(DEFAULT_PREFIX)
}

/// Read and validate the configuration from `<prefix>_*` variables
pub fn from_env_prefixed(prefix: &str) -> Result<JsonLogConfig> {
    let config: JsonLogConfig = envy::prefixed(format!("{}_", prefix))
        .from_env()
        .map_err(|err| {
            tracing::warn!(prefix, error = %err, "unreadable logging configuration");
            err
        })?;
    if let Err(err) = config.validate() {
        tracing::warn!(prefix, error = %err, "invalid logging configuration");
        return Err(err.into());
    }
    tracing::debug!(
        prefix,
        include = config.include_keys.len(),
        exclude = config.exclude_keys.len(),
        "logging configuration loaded from environment"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonlog_core::{ConfigError, FieldMap, KeyPath};
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    const VARS: [&str; 4] = [
        "JLTEST_INCLUDE_KEYS",
        "JLTEST_EXCLUDE_KEYS",
        "JLTEST_REMOVE_EMPTY",
        "JLTEST_FIELDS",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear();
        let config = from_env_prefixed("JLTEST").unwrap();
        assert_eq!(config, JsonLogConfig::default());
    }

    #[test]
    #[serial]
    fn test_reads_prefixed_variables() {
        clear();
        env::set_var("JLTEST_INCLUDE_KEYS", "request.META.REQUEST_METHOD,request.environ");
        env::set_var("JLTEST_EXCLUDE_KEYS", "request.environ.wsgi");
        env::set_var("JLTEST_REMOVE_EMPTY", "true");
        env::set_var("JLTEST_FIELDS", "level=levelname,message=message");

        let config = from_env_prefixed("JLTEST").unwrap();
        clear();

        assert_eq!(
            config.include_keys,
            vec!["request.META.REQUEST_METHOD", "request.environ"]
        );
        assert_eq!(config.exclude_keys, vec!["request.environ.wsgi"]);
        assert!(config.remove_empty);
        assert_eq!(config.fields, FieldMap::parse("level=levelname,message=message"));
    }

    #[test]
    #[serial]
    fn test_spaces_after_commas_are_ignored() {
        clear();
        env::set_var("JLTEST_INCLUDE_KEYS", "request.method, request.path");
        env::set_var("JLTEST_EXCLUDE_KEYS", " request.path.query");
        let config = from_env_prefixed("JLTEST").unwrap();
        clear();

        let filter = config.key_filter().unwrap();
        let rendered: Vec<&str> = filter.include_rules().iter().map(KeyPath::as_str).collect();
        assert_eq!(rendered, vec!["request.method", "request.path"]);
        assert!(filter.allows(&KeyPath::parse("request.path").unwrap()));
        assert!(!filter.allows(&KeyPath::parse("request.path.query").unwrap()));
    }

    #[test]
    #[serial]
    fn test_invalid_rule_is_rejected() {
        clear();
        env::set_var("JLTEST_EXCLUDE_KEYS", "request..environ");
        let result = from_env_prefixed("JLTEST");
        clear();

        assert!(matches!(
            result,
            Err(Error::Invalid(ConfigError::EmptySegment(_)))
        ));
    }

    #[test]
    #[serial]
    fn test_bad_value_is_env_error() {
        clear();
        env::set_var("JLTEST_REMOVE_EMPTY", "sometimes");
        let result = from_env_prefixed("JLTEST");
        clear();

        assert!(matches!(result, Err(Error::Env(_))));
    }

    #[test]
    #[serial]
    fn test_load_dotenv_from_file() {
        clear();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "JLTEST_INCLUDE_KEYS=request.method").unwrap();
        writeln!(file, "JLTEST_REMOVE_EMPTY=true").unwrap();
        drop(file);

        load_dotenv_from(&path).unwrap();
        let config = from_env_prefixed("JLTEST").unwrap();
        clear();

        assert_eq!(config.include_keys, vec!["request.method"]);
        assert!(config.remove_empty);
    }

    #[test]
    fn test_missing_dotenv_file() {
        let err = load_dotenv_from("/nonexistent/jsonlog/.env").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/jsonlog/.env"));
    }
}
